//! Ethereum infrastructure - Alloy-backed chain client

mod provider;

pub use provider::{create_client, AlloyClient, ProviderConfig, SignerConfig};
