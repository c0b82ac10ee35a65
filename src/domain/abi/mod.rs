//! ABI domain models
//!
//! Interface descriptions are validated here, independent of how they are
//! discovered on disk or what the generator emits for them.

mod artifact;
mod contract;
mod types;

pub use artifact::{Bytecode, ContractSource};
pub use contract::{
    selector_of, ConstructorSpec, ContractDescription, ErrorSpec, EventParamSpec, EventSpec,
    FunctionSpec, Mutability, ParamSpec,
};
pub use types::{AbiType, TupleField, TypeError, MAX_TUPLE_ARITY};
