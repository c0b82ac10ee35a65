//! Domain layer - interface descriptions and generation errors

pub mod abi;
mod error;

pub use error::GenerationError;
