//! Binding generator
//!
//! Turns validated [`ContractDescription`]s into Rust modules that compose
//! over [`crate::runtime`]. Generation is pure and deterministic; output is
//! only touched by [`GeneratedBindings::write_to`].

mod naming;
mod render;
mod types;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::abi::ContractDescription;
use crate::domain::GenerationError;

pub use naming::{module_name, to_pascal_case, to_snake_case};
pub use types::rust_type;

use render::{ContractModule, HEADER};

/// Name of the index module written next to the contract modules
pub const INDEX_FILE: &str = "mod.rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Crate path generated code imports the runtime from
    pub runtime_crate: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "abibind".to_string(),
        }
    }
}

/// Rendered bindings of one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContract {
    /// Contract name as given in the input
    pub name: String,
    /// Module (and file stem) name
    pub module: String,
    pub accessor: String,
    pub factory: String,
    pub source: String,
}

impl GeneratedContract {
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.module)
    }
}

/// A full set of rendered modules plus their index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBindings {
    pub contracts: Vec<GeneratedContract>,
    /// Contents of `mod.rs`
    pub index: String,
}

#[derive(Debug, Clone, Default)]
pub struct BindingGenerator {
    options: GeneratorOptions,
}

impl BindingGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Render the module for one contract
    pub fn generate(&self, desc: &ContractDescription) -> Result<GeneratedContract, GenerationError> {
        let module = ContractModule::plan(desc, &self.options.runtime_crate)?;
        let source = module.render();
        debug!(contract = %desc.name, bytes = source.len(), "rendered bindings");

        Ok(GeneratedContract {
            name: desc.name.clone(),
            module: module_name(&desc.name),
            accessor: module.accessor().to_string(),
            factory: module.factory().to_string(),
            source,
        })
    }

    /// Render every contract and the index; fails as a whole if any
    /// contract fails
    pub fn generate_all(
        &self,
        descriptions: &[ContractDescription],
    ) -> Result<GeneratedBindings, GenerationError> {
        let mut sorted: Vec<&ContractDescription> = descriptions.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut contracts: Vec<GeneratedContract> = Vec::with_capacity(sorted.len());
        // Every name the index re-exports, across all contracts
        let mut exported: BTreeSet<String> = BTreeSet::new();
        for desc in sorted {
            let generated = self.generate(desc)?;
            if contracts
                .iter()
                .any(|c| c.name == generated.name || c.module == generated.module)
            {
                return Err(GenerationError::DuplicateContract {
                    name: generated.name,
                });
            }
            for ident in [&generated.accessor, &generated.factory] {
                if !exported.insert(ident.clone()) {
                    return Err(GenerationError::NameCollision {
                        contract: generated.name.clone(),
                        name: ident.clone(),
                    });
                }
            }
            contracts.push(generated);
        }

        let index = render_index(&contracts);
        info!(contracts = contracts.len(), "generated bindings");
        Ok(GeneratedBindings { contracts, index })
    }
}

fn render_index(contracts: &[GeneratedContract]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    if contracts.is_empty() {
        return out;
    }
    out.push('\n');
    for contract in contracts {
        out.push_str(&format!("pub mod {};\n", contract.module));
    }
    out.push('\n');
    for contract in contracts {
        out.push_str(&format!(
            "pub use {}::{{{}, {}}};\n",
            contract.module, contract.accessor, contract.factory
        ));
    }
    out
}

impl GeneratedBindings {
    /// (file name, contents) pairs, index last
    pub fn files(&self) -> Vec<(String, &str)> {
        let mut files: Vec<(String, &str)> = self
            .contracts
            .iter()
            .map(|c| (c.file_name(), c.source.as_str()))
            .collect();
        files.push((INDEX_FILE.to_string(), self.index.as_str()));
        files
    }

    /// Write every file into `dir`, replacing earlier output
    ///
    /// All files are first written to temporary siblings; only when every
    /// one succeeded are they renamed into place. Files in `dir` that are
    /// not part of this set are left alone.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
        let io = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| GenerationError::Io { path, source }
        };

        fs::create_dir_all(dir).map_err(io(dir))?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (name, contents) in self.files() {
            let target = dir.join(&name);
            let temp = dir.join(format!(".{name}.tmp"));
            if let Err(e) = fs::write(&temp, contents) {
                discard(&staged);
                let _ = fs::remove_file(&temp);
                return Err(io(&temp)(e));
            }
            staged.push((temp, target));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (idx, (temp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(temp, target) {
                discard(&staged[idx..]);
                return Err(io(target)(e));
            }
            debug!(path = %target.display(), "wrote bindings");
            written.push(target.clone());
        }

        info!(dir = %dir.display(), files = written.len(), "bindings written");
        Ok(written)
    }

    /// Files in `dir` that are missing or differ from this set
    pub fn check(&self, dir: &Path) -> Result<Vec<PathBuf>, GenerationError> {
        let mut stale = Vec::new();
        for (name, contents) in self.files() {
            let path = dir.join(&name);
            match fs::read_to_string(&path) {
                Ok(existing) if existing == contents => {}
                Ok(_) => stale.push(path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => stale.push(path),
                Err(source) => return Err(GenerationError::Io { path, source }),
            }
        }
        Ok(stale)
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}
