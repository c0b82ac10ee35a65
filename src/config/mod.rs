use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

/// Project configuration, usually `abibind.toml`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Directories (or files) to scan for ABIs and artifacts
    #[serde(default = "default_artifact_paths")]
    pub artifact_paths: Vec<String>,

    /// Where generated modules are written
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Crate path generated code imports the runtime from
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    /// Only generate these contracts (all when empty)
    #[serde(default)]
    pub include: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_paths: default_artifact_paths(),
            out_dir: default_out_dir(),
            runtime_crate: default_runtime_crate(),
            include: Vec::new(),
        }
    }
}

fn default_artifact_paths() -> Vec<String> {
    vec!["artifacts".to_string(), "out".to_string()]
}

fn default_out_dir() -> String {
    "src/bindings".to_string()
}

fn default_runtime_crate() -> String {
    "abibind".to_string()
}

impl Config {
    /// Whether `contract` passes the `include` list
    pub fn includes(&self, contract: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|name| name == contract)
    }
}

/// Load the configuration; missing or unreadable files give the defaults
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

pub fn load_from(path: &std::path::Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring invalid config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ABIBIND_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    let local = PathBuf::from("abibind.toml");
    if local.is_file() {
        return Some(local);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("abibind").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("abibind").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "abibind", "abibind")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
