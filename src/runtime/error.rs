//! Runtime errors surfaced by generated bindings

use alloy_primitives::{Bytes, B256};

/// Failure reported by a [`ChainClient`](super::ChainClient)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The node refused the request (bad signature, insufficient funds,
    /// nonce conflict, ...)
    #[error("rejected by node (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// Execution reverted; `data` is the raw revert payload
    #[error("execution reverted: {message}")]
    Reverted { data: Bytes, message: String },

    /// Connection or transport failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Which stage of an operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Checked locally, nothing was sent
    LocalValidation,
    /// The transaction was not accepted by the node
    Submission,
    /// Submitted, but no receipt was obtained
    Confirmation,
    /// Executed (or simulated) and reverted
    Execution,
    /// A read-only request failed
    Query,
}

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("invalid address `{input}`: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("no signer or provider is connected")]
    MissingClient,

    #[error("the connected client has no signing account")]
    MissingSigner,

    #[error("contract has no deployment bytecode")]
    NotDeployable,

    #[error("constructor is not payable but a value was attached")]
    ValueNotAccepted,

    #[error("function `{0}` is not part of the contract ABI")]
    UnknownFunction(String),

    #[error("event `{0}` is not part of the contract ABI")]
    UnknownEvent(String),

    #[error("invalid contract ABI: {0}")]
    Abi(String),

    #[error("failed to encode arguments: {0}")]
    Encode(String),

    #[error("failed to decode: {0}")]
    Decode(String),

    #[error("transaction submission failed: {0}")]
    Submission(ClientError),

    #[error("query failed: {0}")]
    Query(ClientError),

    #[error("transaction {tx_hash} was not confirmed: {reason}")]
    Confirmation { tx_hash: B256, reason: String },

    #[error("execution reverted{}", display_reason(.reason))]
    Reverted {
        tx_hash: Option<B256>,
        reason: Option<String>,
    },
}

impl BindingError {
    pub fn stage(&self) -> FailureStage {
        match self {
            BindingError::InvalidAddress { .. }
            | BindingError::MissingClient
            | BindingError::MissingSigner
            | BindingError::NotDeployable
            | BindingError::ValueNotAccepted
            | BindingError::UnknownFunction(_)
            | BindingError::UnknownEvent(_)
            | BindingError::Abi(_)
            | BindingError::Encode(_) => FailureStage::LocalValidation,
            BindingError::Submission(_) => FailureStage::Submission,
            BindingError::Decode(_) | BindingError::Query(_) => FailureStage::Query,
            BindingError::Confirmation { .. } => FailureStage::Confirmation,
            BindingError::Reverted { .. } => FailureStage::Execution,
        }
    }

    /// Decoded revert reason, if execution reverted with one
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            BindingError::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

fn display_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}
