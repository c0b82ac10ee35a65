//! Chain client seam
//!
//! Generated bindings never talk to a node directly; everything goes
//! through [`ChainClient`], which a caller supplies as signer or provider.

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, B256};
use tokio::sync::mpsc;

use super::ClientError;

/// Mined transaction receipt (chain-agnostic subset)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// Set for contract-creation transactions
    pub contract_address: Option<Address>,
    /// `false` if execution reverted
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<RawLog>,
}

/// A log entry as returned by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<u64>,
    pub tx_hash: Option<B256>,
    pub log_index: Option<u64>,
}

/// Log query: `topics[i] == None` matches anything at position `i`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogQuery {
    pub address: Option<Address>,
    pub topics: Vec<Option<B256>>,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

impl LogQuery {
    /// Whether `log` satisfies this query
    pub fn matches(&self, log: &RawLog) -> bool {
        if let Some(address) = self.address {
            if log.address != address {
                return false;
            }
        }
        if let (Some(from), Some(block)) = (self.from_block, log.block_number) {
            if block < from {
                return false;
            }
        }
        if let (Some(to), Some(block)) = (self.to_block, log.block_number) {
            if block > to {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(idx, wanted)| match wanted {
            None => true,
            Some(topic) => log.topics.get(idx) == Some(topic),
        })
    }
}

/// Signing/provider context used by bindings
///
/// A client without a [`sender`](ChainClient::sender) acts as a read-only
/// provider: view calls and log queries work, submissions fail with
/// `MissingSigner`.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Account that authorizes submitted transactions
    fn sender(&self) -> Option<Address>;

    /// Get the current block number
    async fn block_number(&self) -> Result<u64, ClientError>;

    /// Execute a call without creating a transaction (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes, ClientError>;

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64, ClientError>;

    /// Sign (if needed) and submit a transaction, returning its hash
    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256, ClientError>;

    /// `Ok(None)` while the transaction is still pending
    async fn get_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, ClientError>;

    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, ClientError>;

    /// Subscribe to new logs matching `query` (block range ignored)
    ///
    /// `Ok(None)` when the transport cannot push logs; callers poll
    /// [`get_logs`](ChainClient::get_logs) instead.
    async fn subscribe_logs(
        &self,
        _query: &LogQuery,
    ) -> Result<Option<mpsc::Receiver<RawLog>>, ClientError> {
        Ok(None)
    }

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}
