//! Generation-time errors

use std::path::PathBuf;

/// Fatal error while turning one interface description into bindings.
///
/// Any of these aborts generation for the affected contract; no partial
/// output is ever written.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{contract}: malformed ABI: {reason}")]
    Malformed { contract: String, reason: String },

    #[error("{contract}: unknown type `{ty}` in {location}")]
    UnknownType {
        contract: String,
        location: String,
        ty: String,
    },

    #[error("{contract}: unsupported type in {location}: {reason}")]
    UnsupportedType {
        contract: String,
        location: String,
        reason: String,
    },

    #[error("{contract}: selector {selector} is shared by `{first}` and `{second}`")]
    DuplicateSelector {
        contract: String,
        selector: String,
        first: String,
        second: String,
    },

    #[error("{contract}: event `{signature}` is declared more than once")]
    DuplicateEvent { contract: String, signature: String },

    #[error("{contract}: invalid bytecode: {reason}")]
    InvalidBytecode { contract: String, reason: String },

    #[error("{contract}: generated name `{name}` is used more than once")]
    NameCollision { contract: String, name: String },

    #[error("contract `{name}` appears more than once in the input set")]
    DuplicateContract { name: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
