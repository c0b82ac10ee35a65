//! ABI infrastructure - artifact discovery on disk

mod scanner;

pub use scanner::{AbiScanner, ScanReport};
