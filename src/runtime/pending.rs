//! Waiting for submitted transactions

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use tokio::time::Instant;
use tracing::debug;

use super::client::{ChainClient, Receipt};
use super::BindingError;

/// How receipts are polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    /// Give up waiting after this long
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(120),
        }
    }
}

/// A submitted transaction whose outcome is not yet known
///
/// Dropping it, or timing out in [`confirm`](Self::confirm), only stops
/// waiting; the submission itself is never retracted or retried.
pub struct PendingTransaction {
    client: Arc<dyn ChainClient>,
    tx_hash: B256,
    policy: ConfirmationPolicy,
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("policy", &self.policy)
            .finish()
    }
}

impl PendingTransaction {
    pub fn new(client: Arc<dyn ChainClient>, tx_hash: B256) -> Self {
        Self {
            client,
            tx_hash,
            policy: ConfirmationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait until the transaction is mined
    ///
    /// A mined transaction with failed status is [`BindingError::Reverted`].
    pub async fn confirm(self) -> Result<Receipt, BindingError> {
        let deadline = Instant::now() + self.policy.timeout;
        loop {
            match self.client.get_receipt(self.tx_hash).await {
                Ok(Some(receipt)) => {
                    debug!(tx_hash = %self.tx_hash, status = receipt.status, "receipt received");
                    if !receipt.status {
                        return Err(BindingError::Reverted {
                            tx_hash: Some(self.tx_hash),
                            reason: None,
                        });
                    }
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(BindingError::Confirmation {
                        tx_hash: self.tx_hash,
                        reason: e.to_string(),
                    })
                }
            }

            if Instant::now() >= deadline {
                return Err(BindingError::Confirmation {
                    tx_hash: self.tx_hash,
                    reason: format!("no receipt after {:?}", self.policy.timeout),
                });
            }
            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }
}
