//! Binding runtime
//!
//! Generated accessors and factories are thin typed layers over the types
//! in this module. Everything they need is re-exported from [`prelude`].

mod abi;
pub mod address;
mod call;
mod client;
mod error;
mod event;
mod factory;
mod format;
mod instance;
mod pending;
mod value;

pub use abi::{ContractAbi, DecodedParts};
pub use address::{parse_address, to_checksum_address};
pub use call::{CallKind, ContractCall, NonPayable, Overrides, Payable, StateMutating, View};
pub use client::{ChainClient, LogQuery, RawLog, Receipt};
pub use error::{BindingError, ClientError, FailureStage};
pub use event::{value_topic, ContractEvent, DecodedLog, EventFilter};
pub use factory::ContractFactory;
pub use format::format_value;
pub use instance::ContractInstance;
pub use pending::{ConfirmationPolicy, PendingTransaction};
pub use value::{
    decode_single, decode_tuple, decode_unit, expect_tuple, next_value, FromSolValue,
    IntoSolValue,
};

/// Everything generated bindings refer to
pub mod prelude {
    pub use super::{
        decode_single, decode_tuple, decode_unit, expect_tuple, next_value, value_topic,
        BindingError, ChainClient, ContractAbi, ContractCall, ContractEvent, ContractFactory,
        ContractInstance, DecodedLog, EventFilter, FromSolValue, IntoSolValue, NonPayable,
        Overrides, Payable, View,
    };
    pub use alloy::rpc::types::TransactionRequest;
    pub use alloy_dyn_abi::DynSolValue;
    pub use alloy_primitives::{Address, Bytes, FixedBytes, B256, I256, U256};
}
