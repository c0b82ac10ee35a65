//! Artifact scanner - discovers ABI and artifact files on the filesystem

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::abi::ContractSource;

/// Artifacts larger than this are skipped
const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// Contract sources found under one or more roots
#[derive(Debug, Default)]
pub struct ScanReport {
    pub sources: Vec<ContractSource>,
    pub scanned_files: usize,
    /// Files that looked like artifacts but could not be read
    pub errors: Vec<String>,
    pub scan_ms: u128,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.sources.extend(other.sources);
        self.scanned_files += other.scanned_files;
        self.errors.extend(other.errors);
    }
}

/// ABI/artifact file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root (directory or file) for contract sources
    pub fn scan(root: impl AsRef<Path>) -> ScanReport {
        let started = Instant::now();
        let root = root.as_ref();
        let mut report = ScanReport::default();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    report.errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::is_candidate(path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    report.errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_FILE_BYTES {
                warn!(path = %path.display(), bytes = metadata.len(), "skipping oversized artifact");
                continue;
            }

            report.scanned_files += 1;

            match Self::load_file(path) {
                Ok(Some(source)) => report.sources.push(source),
                Ok(None) => debug!(path = %path.display(), "no ABI in file"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable artifact");
                    report.errors.push(format!("{}: {:#}", path.display(), err));
                }
            }
        }

        report.scan_ms = started.elapsed().as_millis();
        report
    }

    /// Scan multiple roots
    pub fn scan_roots(roots: &[PathBuf]) -> ScanReport {
        let started = Instant::now();
        let mut report = ScanReport::default();

        for root in roots {
            report.merge(Self::scan(root));
        }

        report.scan_ms = started.elapsed().as_millis();
        report
    }

    /// Load one ABI or artifact file
    ///
    /// `Ok(None)` means the file is valid JSON without an ABI.
    pub fn load_file(path: &Path) -> Result<Option<ContractSource>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).context("invalid JSON")?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        // Either a raw ABI array or an artifact with an "abi" field
        if value.is_array() {
            return Ok(Some(ContractSource {
                name: stem,
                abi: value,
                bytecode: None,
                path: path.to_path_buf(),
            }));
        }

        let Some(abi) = value.get("abi") else {
            return Ok(None);
        };
        if !abi.is_array() {
            bail!("`abi` field is not an array");
        }

        let name = value
            .get("contractName")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(stem);

        Ok(Some(ContractSource {
            name,
            abi: abi.clone(),
            bytecode: Self::extract_bytecode(&value),
            path: path.to_path_buf(),
        }))
    }

    /// Hardhat stores bytecode as a string, Foundry as `{ "object": ... }`
    fn extract_bytecode(artifact: &serde_json::Value) -> Option<String> {
        let bytecode = artifact.get("bytecode")?;
        bytecode
            .as_str()
            .or_else(|| bytecode.get("object").and_then(|v| v.as_str()))
            .map(str::to_string)
    }

    fn is_candidate(path: &Path) -> bool {
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            return false;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        !name.ends_with(".dbg.json") && !Self::path_contains_any(path, &["build-info"])
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules" | "build-info"))
            .unwrap_or(false)
    }

    /// Check if path contains any of the given names
    fn path_contains_any(path: &Path, names: &[&str]) -> bool {
        path.components().any(|component| {
            if let std::path::Component::Normal(value) = component {
                if let Some(value) = value.to_str() {
                    return names.iter().any(|name| *name == value);
                }
            }
            false
        })
    }
}
