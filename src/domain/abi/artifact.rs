//! Deployment artifacts and raw contract sources

use std::path::PathBuf;

use alloy_primitives::Bytes;

use super::ContractDescription;
use crate::domain::GenerationError;

/// Immutable compiled bytecode used for deployment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bytecode(Bytes);

impl Bytecode {
    /// Parse `0x`-prefixed (or bare) hex bytecode
    ///
    /// Unlinked library placeholders (`__$...$__`) are rejected since the
    /// payload could never be deployed as-is.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        let payload = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if payload.contains("__") {
            return Err("bytecode contains unlinked library placeholders".to_string());
        }

        let bytes = hex::decode(payload).map_err(|e| format!("invalid hex: {e}"))?;
        Ok(Self(Bytes::from(bytes)))
    }

    /// Empty bytecode marks an interface or abstract contract
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

/// An interface description as found on disk, not yet validated
#[derive(Debug, Clone)]
pub struct ContractSource {
    /// Contract name (`contractName` or the file stem)
    pub name: String,
    /// The ABI array
    pub abi: serde_json::Value,
    /// Hex bytecode, if the artifact carried any
    pub bytecode: Option<String>,
    /// File the source was read from
    pub path: PathBuf,
}

impl ContractSource {
    /// Validate the source into a contract description
    pub fn describe(&self) -> Result<ContractDescription, GenerationError> {
        ContractDescription::from_json(&self.name, &self.abi, self.bytecode.as_deref())
    }
}
