//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Artifact discovery on disk
//! - The alloy-based chain client

pub mod abi;
pub mod ethereum;

pub use abi::{AbiScanner, ScanReport};
pub use ethereum::{create_client, AlloyClient, ProviderConfig, SignerConfig};
