use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::runtime::ModuleOrigin;

/// Engine-level settings shared by every module the driver creates.
///
/// Layering, lowest to highest: defaults, config file, `OTTERWRAP_*`
/// environment variables, command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// `tracing` filter directives used when `OTTERWRAP_LOG` is unset.
    pub log_filter: String,
    /// Workers used to compile import wrappers during instantiation.
    pub worker_threads: usize,
    /// Forces every module to this origin regardless of its manifest.
    pub origin_override: Option<ModuleOrigin>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            log_filter: otterwrap_utils::logger::DEFAULT_FILTER.to_string(),
            worker_threads: workers,
            origin_override: None,
        }
    }
}

impl EngineConfig {
    /// Defaults, then `path` if given, then the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a YAML file, or a TOML file when built with `toml-config`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            return Self::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()));
        }
        serde_yaml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    #[cfg(feature = "toml-config")]
    fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[cfg(not(feature = "toml-config"))]
    fn from_toml_str(_text: &str) -> Result<Self> {
        anyhow::bail!("TOML configuration requires the `toml-config` feature")
    }

    /// Overlay `OTTERWRAP_LOG`, `OTTERWRAP_THREADS` and `OTTERWRAP_ORIGIN`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(filter) = lookup("OTTERWRAP_LOG") {
            self.log_filter = filter;
        }
        if let Some(val) = lookup("OTTERWRAP_THREADS") {
            match val.parse::<usize>() {
                Ok(threads) if threads > 0 => self.worker_threads = threads,
                _ => warn!(value = %val, "ignoring invalid OTTERWRAP_THREADS"),
            }
        }
        if let Some(val) = lookup("OTTERWRAP_ORIGIN") {
            match ModuleOrigin::from_name(&val) {
                Some(origin) => self.origin_override = Some(origin),
                None => warn!(value = %val, "ignoring invalid OTTERWRAP_ORIGIN"),
            }
        }
    }
}
