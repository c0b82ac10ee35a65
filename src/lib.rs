//! Typed contract bindings for EVM smart contracts
//!
//! [`codegen`] turns ABI documents into Rust modules; the modules it emits
//! build on [`runtime`], which talks to the chain through
//! [`runtime::ChainClient`].

pub mod codegen;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
