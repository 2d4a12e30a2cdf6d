//! Engine configuration — strategy registry contents and consensus settings, loaded from TOML.
//!
//! ```toml
//! parallel = true
//!
//! [consensus]
//! action_floor = 0.3
//!
//! [strategies.ma_fast]
//! kind = "ma_cross"
//! [strategies.ma_fast.params]
//! short_period = 3
//! long_period = 10
//! ```
//!
//! A `[strategies]` table, when present, is the complete registry: only the
//! strategies it names are registered. Without one, the three built-in
//! strategies are registered with default parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::manager::ConsensusConfig;
use crate::strategy::{ParamMap, StrategyKind};

/// Errors that can occur while loading or resolving engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Strategy '{0}' has no kind and its name is not a known strategy kind")]
    UnknownKind(String),
    #[error("Invalid consensus action_floor: {0}")]
    InvalidFloor(f64),
}

/// One registry entry: which implementation to build and its parameter overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Implementation to build. Defaults to the entry's name when that is a known kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StrategyKind>,
    pub params: ParamMap,
}

impl StrategyConfig {
    pub fn of_kind(kind: StrategyKind) -> Self {
        Self {
            kind: Some(kind),
            params: ParamMap::new(),
        }
    }

    /// Explicit kind, or the kind named by `name`.
    pub fn resolve_kind(&self, name: &str) -> Result<StrategyKind, ConfigError> {
        match self.kind {
            Some(kind) => Ok(kind),
            None => name
                .parse()
                .map_err(|_| ConfigError::UnknownKind(name.to_string())),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fan strategies out across threads within one batch.
    pub parallel: bool,
    pub consensus: ConsensusConfig,
    pub strategies: BTreeMap<String, StrategyConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            consensus: ConsensusConfig::default(),
            strategies: StrategyKind::ALL
                .into_iter()
                .map(|kind| (kind.as_str().to_string(), StrategyConfig::of_kind(kind)))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check everything that can be checked without building strategies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floor = self.consensus.action_floor;
        if !(0.0..1.0).contains(&floor) {
            return Err(ConfigError::InvalidFloor(floor));
        }
        for (name, entry) in &self.strategies {
            entry.resolve_kind(name)?;
        }
        Ok(())
    }
}
