//! Alloy-backed chain client
//!
//! Wraps a type-erased alloy provider (HTTP or WebSocket) and an optional
//! local signer behind the [`ChainClient`] seam used by generated bindings.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportErrorKind};
use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::debug;

use crate::runtime::{ChainClient, ClientError, LogQuery, RawLog, Receipt};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Pick the transport from the URL scheme
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("ws://") || url.starts_with("wss://") {
            ProviderConfig::WebSocket(url.to_string())
        } else {
            ProviderConfig::Http(url.to_string())
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }

    /// Check if this is a WebSocket endpoint
    pub fn is_websocket(&self) -> bool {
        matches!(self, ProviderConfig::WebSocket(_))
    }
}

/// Who authorizes submitted transactions
#[derive(Debug, Clone)]
pub enum SignerConfig {
    /// Hex private key; transactions are signed locally
    PrivateKey(String),
    /// Account managed by the node (dev nodes); sent via eth_sendTransaction
    Unlocked(Address),
}

/// [`ChainClient`] over an alloy provider
pub struct AlloyClient {
    provider: DynProvider,
    sender: Option<Address>,
    endpoint: String,
    /// WebSocket transports can push logs
    pubsub: bool,
}

impl std::fmt::Debug for AlloyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyClient")
            .field("endpoint", &self.endpoint)
            .field("sender", &self.sender)
            .field("pubsub", &self.pubsub)
            .finish()
    }
}

/// Create a client from configuration
///
/// Without a signer the client is read-only: calls and log queries work,
/// submissions fail with `MissingSigner`.
pub async fn create_client(
    config: ProviderConfig,
    signer: Option<SignerConfig>,
) -> Result<Arc<dyn ChainClient>> {
    let endpoint = config.display();
    let pubsub = config.is_websocket();

    let (wallet, sender) = match signer {
        Some(SignerConfig::PrivateKey(key)) => {
            let key = key.trim();
            let signer: PrivateKeySigner = key
                .strip_prefix("0x")
                .unwrap_or(key)
                .parse()
                .context("Invalid private key")?;
            let address = signer.address();
            (Some(EthereumWallet::from(signer)), Some(address))
        }
        Some(SignerConfig::Unlocked(address)) => (None, Some(address)),
        None => (None, None),
    };

    let provider = match (config, wallet) {
        (ProviderConfig::Http(url), Some(wallet)) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(rpc_url)
                .erased()
        }
        (ProviderConfig::Http(url), None) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new().connect_http(rpc_url).erased()
        }
        (ProviderConfig::WebSocket(url), Some(wallet)) => ProviderBuilder::new()
            .wallet(wallet)
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?
            .erased(),
        (ProviderConfig::WebSocket(url), None) => ProviderBuilder::new()
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?
            .erased(),
    };

    debug!(%endpoint, ?sender, "chain client ready");
    Ok(Arc::new(AlloyClient {
        provider,
        sender,
        endpoint,
        pubsub,
    }))
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn block_number(&self) -> Result<u64, ClientError> {
        self.provider.get_block_number().await.map_err(classify)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes, ClientError> {
        self.provider.call(request).await.map_err(classify)
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, ClientError> {
        self.provider.estimate_gas(request).await.map_err(classify)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256, ClientError> {
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(classify)?;
        Ok(*pending.tx_hash())
    }

    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, ClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(classify)?;
        Ok(receipt.map(convert_receipt))
    }

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, ClientError> {
        let logs = self
            .provider
            .get_logs(&build_filter(query))
            .await
            .map_err(classify)?;
        Ok(logs.iter().map(convert_log).collect())
    }

    async fn subscribe_logs(
        &self,
        query: &LogQuery,
    ) -> Result<Option<mpsc::Receiver<RawLog>>, ClientError> {
        if !self.pubsub {
            return Ok(None);
        }

        let sub = self
            .provider
            .subscribe_logs(&build_filter(query))
            .await
            .map_err(classify)?;
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            let mut stream = sub.into_stream();
            while let Some(log) = stream.next().await {
                if tx.send(convert_log(&log)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Some(rx))
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

/// Split node failures into rejections, reverts and transport errors
fn classify(err: RpcError<TransportErrorKind>) -> ClientError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            return ClientError::Reverted {
                data,
                message: payload.message.to_string(),
            };
        }
        return ClientError::Rejected {
            code: payload.code,
            message: payload.message.to_string(),
        };
    }
    ClientError::Transport(err.to_string())
}

fn build_filter(query: &LogQuery) -> Filter {
    let mut filter = Filter::new();
    if let Some(address) = query.address {
        filter = filter.address(address);
    }
    for (idx, topic) in query.topics.iter().enumerate() {
        let Some(topic) = *topic else { continue };
        filter = match idx {
            0 => filter.event_signature(topic),
            1 => filter.topic1(topic),
            2 => filter.topic2(topic),
            3 => filter.topic3(topic),
            _ => filter,
        };
    }
    if let Some(from) = query.from_block {
        filter = filter.from_block(from);
    }
    if let Some(to) = query.to_block {
        filter = filter.to_block(to);
    }
    filter
}

fn convert_receipt(receipt: TransactionReceipt) -> Receipt {
    Receipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        contract_address: receipt.contract_address,
        status: receipt.status(),
        gas_used: receipt.gas_used,
        logs: receipt.inner.logs().iter().map(convert_log).collect(),
    }
}

fn convert_log(log: &Log) -> RawLog {
    RawLog {
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        block_number: log.block_number,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_from_url() {
        assert!(ProviderConfig::from_url("ws://localhost:8546").is_websocket());
        assert!(ProviderConfig::from_url("wss://node.example").is_websocket());
        assert!(!ProviderConfig::from_url("http://127.0.0.1:8545").is_websocket());
        assert_eq!(
            ProviderConfig::from_url("http://127.0.0.1:8545").display(),
            "http://127.0.0.1:8545"
        );
    }
}
