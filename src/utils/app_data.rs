use crate::session::Command;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "sift";
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SIFT_CONFIG";

/// User configuration, overridden by command-line flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rank matches by score
    #[serde(default = "default_sort")]
    pub sort: bool,

    /// Scoring threads. 0 means one per CPU core
    #[serde(default)]
    pub threads: usize,

    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Text shown after the match counts
    #[serde(default)]
    pub header: String,

    /// Query results remembered per universe. 0 disables the cache
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Longest escape sequence masked before scanning gives up
    #[serde(default = "default_escape_scan_limit")]
    pub escape_scan_limit: usize,

    /// Editor command line, overriding $VISUAL and $EDITOR
    #[serde(default)]
    pub editor: Option<String>,

    /// Key spec to command, merged over the default keymap
    #[serde(default)]
    pub bindings: BTreeMap<String, Command>,
}

fn default_sort() -> bool {
    true
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_cache_size() -> usize {
    64
}

fn default_escape_scan_limit() -> usize {
    crate::store::DEFAULT_ESCAPE_SCAN_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
            threads: 0,
            prompt: default_prompt(),
            header: String::new(),
            cache_size: default_cache_size(),
            escape_scan_limit: default_escape_scan_limit(),
            editor: None,
            bindings: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load from `$SIFT_CONFIG` or the platform config dir; defaults if absent
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the effective thread count (resolves 0 to CPU count)
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus()
        } else {
            self.threads
        }
    }
}

/// Get the number of CPUs available
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Path of the config file, if one can be named
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
