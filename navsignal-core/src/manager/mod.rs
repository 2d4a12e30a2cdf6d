//! Strategy manager — registry, batch evaluation with failure isolation, and consensus.
//!
//! The registry is copy-on-write: readers take an `Arc` snapshot of an
//! immutable map, writers build a new map and swap it in under a write lock,
//! bumping a version counter. A batch holds one snapshot for its whole run,
//! so concurrent add/remove/reconfigure never changes the set of strategies
//! a batch sees.

pub mod consensus;

pub use consensus::{aggregate, ConsensusConfig, DEFAULT_ACTION_FLOOR};

use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ConfigError, EngineConfig};
use crate::domain::NavSeries;
use crate::signal::StrategySignal;
use crate::strategy::{
    create_strategy, DynamicPercentile, MovingAverageCross, ParamError, ParamMap, Strategy,
    StrategyDescription, TrendFollowing,
};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors surfaced by manager operations addressed at one strategy.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Strategy not found: {0}")]
    NotFound(String),
    #[error("Invalid parameters for strategy '{name}': {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: ParamError,
    },
    #[error("Strategy '{name}' failed: {message}")]
    StrategyFailed { name: String, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── Batch results ───────────────────────────────────────────────────

/// A strategy excluded from a batch because its computation panicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyFailure {
    pub name: String,
    pub message: String,
}

/// Per-strategy signals from one registry snapshot, plus the strategies that failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalBatch {
    pub signals: BTreeMap<String, StrategySignal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StrategyFailure>,
    /// Registry version the batch ran against.
    pub registry_version: u64,
}

/// A batch together with the consensus computed from exactly those signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub consensus: StrategySignal,
    #[serde(flatten)]
    pub batch: SignalBatch,
}

// ─── Registry ────────────────────────────────────────────────────────

type Registry = BTreeMap<String, Arc<dyn Strategy>>;

/// Immutable view of the registry at one version.
#[derive(Clone)]
pub struct RegistrySnapshot {
    version: u64,
    strategies: Arc<Registry>,
}

impl RegistrySnapshot {
    fn new(strategies: Registry) -> Self {
        Self {
            version: 0,
            strategies: Arc::new(strategies),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.strategies.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<dyn Strategy>)> {
        self.strategies.iter()
    }
}

// ─── Manager ─────────────────────────────────────────────────────────

/// Owns the strategy registry and runs strategies against NAV series.
pub struct StrategyManager {
    registry: RwLock<RegistrySnapshot>,
    consensus: ConsensusConfig,
    parallel: bool,
}

impl StrategyManager {
    /// Build the registry described by `config`.
    pub fn new(config: &EngineConfig) -> Result<Self, ManagerError> {
        config.validate()?;
        let mut strategies = Registry::new();
        for (name, entry) in &config.strategies {
            let kind = entry.resolve_kind(name)?;
            let strategy = create_strategy(kind, &entry.params).map_err(|source| {
                ManagerError::InvalidParams {
                    name: name.clone(),
                    source,
                }
            })?;
            strategies.insert(name.clone(), Arc::from(strategy));
        }
        tracing::debug!(strategies = strategies.len(), "strategy registry built");
        Ok(Self::from_registry(strategies, config.consensus.clone(), config.parallel))
    }

    /// Manager with no registered strategies.
    pub fn empty() -> Self {
        Self::from_registry(Registry::new(), ConsensusConfig::default(), true)
    }

    fn from_registry(strategies: Registry, consensus: ConsensusConfig, parallel: bool) -> Self {
        Self {
            registry: RwLock::new(RegistrySnapshot::new(strategies)),
            consensus,
            parallel,
        }
    }

    /// Enables or disables parallel evaluation within a batch.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_consensus(mut self, consensus: ConsensusConfig) -> Self {
        self.consensus = consensus;
        self
    }

    pub fn consensus_config(&self) -> &ConsensusConfig {
        &self.consensus
    }

    /// Consistent view of the current registry.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_strategy(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        self.snapshot().get(name).cloned()
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.snapshot().names().cloned().collect()
    }

    // ─── Evaluation ──────────────────────────────────────────────────

    /// Run one strategy by registry name.
    pub fn calculate_signal(
        &self,
        name: &str,
        series: &NavSeries,
    ) -> Result<StrategySignal, ManagerError> {
        let strategy = self
            .get_strategy(name)
            .ok_or_else(|| ManagerError::NotFound(name.to_string()))?;
        run_isolated(name, strategy.as_ref(), series).map_err(|failure| {
            ManagerError::StrategyFailed {
                name: failure.name,
                message: failure.message,
            }
        })
    }

    /// Run every registered strategy. A strategy that panics is reported and
    /// left out; the rest of the batch is unaffected.
    pub fn calculate_all_signals(&self, series: &NavSeries) -> SignalBatch {
        let snapshot = self.snapshot();
        let run = |(name, strategy): (&String, &Arc<dyn Strategy>)| {
            (name.clone(), run_isolated(name, strategy.as_ref(), series))
        };

        let results: Vec<(String, Result<StrategySignal, StrategyFailure>)> = if self.parallel {
            snapshot.strategies.par_iter().map(run).collect()
        } else {
            snapshot.strategies.iter().map(run).collect()
        };

        let mut batch = SignalBatch {
            registry_version: snapshot.version,
            ..SignalBatch::default()
        };
        for (name, result) in results {
            match result {
                Ok(signal) => {
                    batch.signals.insert(name, signal);
                }
                Err(failure) => {
                    tracing::error!(
                        strategy = %failure.name,
                        error = %failure.message,
                        "strategy failed, excluded from batch"
                    );
                    batch.failures.push(failure);
                }
            }
        }
        batch
    }

    /// Per-strategy signals and their consensus from a single batch.
    ///
    /// `weights` overrides the configured weights; `None` (or an empty map)
    /// falls back to the configured weights, then to 1.0 per strategy.
    pub fn evaluate(
        &self,
        series: &NavSeries,
        weights: Option<&BTreeMap<String, f64>>,
    ) -> Evaluation {
        let batch = self.calculate_all_signals(series);
        let weights = match weights.or(self.consensus.weights.as_ref()) {
            Some(w) if !w.is_empty() => w.clone(),
            _ => consensus::equal_weights(batch.signals.keys()),
        };
        let consensus = aggregate(
            &batch.signals,
            &weights,
            self.consensus.action_floor,
            series.as_of(),
        );
        tracing::debug!(
            signal = %consensus.signal_type(),
            strength = consensus.strength(),
            strategies = batch.signals.len(),
            "consensus computed"
        );
        Evaluation { consensus, batch }
    }

    pub fn get_consensus_signal(
        &self,
        series: &NavSeries,
        weights: Option<&BTreeMap<String, f64>>,
    ) -> StrategySignal {
        self.evaluate(series, weights).consensus
    }

    pub fn get_strategy_descriptions(&self) -> BTreeMap<String, StrategyDescription> {
        self.snapshot()
            .iter()
            .map(|(name, strategy)| (name.clone(), strategy.describe()))
            .collect()
    }

    // ─── Registry changes ────────────────────────────────────────────

    /// Register `strategy` under `name`, replacing any existing entry.
    /// Returns true when an entry was replaced.
    pub fn add_strategy(&self, name: impl Into<String>, strategy: Box<dyn Strategy>) -> bool {
        let name = name.into();
        let replaced = self.mutate(|registry| {
            registry.insert(name.clone(), Arc::from(strategy)).is_some()
        });
        tracing::info!(strategy = %name, replaced, "strategy registered");
        replaced
    }

    /// Returns false when no strategy was registered under `name`.
    pub fn remove_strategy(&self, name: &str) -> bool {
        let removed = self.mutate(|registry| registry.remove(name).is_some());
        if removed {
            tracing::info!(strategy = name, "strategy removed");
        }
        removed
    }

    /// Rebuild the named strategy from `params` (defaults for missing keys)
    /// and swap it into the same slot. The rebuild reads the slot under the
    /// write lock, so a concurrent replacement is never overwritten.
    pub fn reconfigure(&self, name: &str, params: &ParamMap) -> Result<(), ManagerError> {
        self.try_mutate(|registry| {
            let slot = registry
                .get_mut(name)
                .ok_or_else(|| ManagerError::NotFound(name.to_string()))?;
            let rebuilt = slot
                .rebuild(params)
                .map_err(|source| ManagerError::InvalidParams {
                    name: name.to_string(),
                    source,
                })?;
            *slot = Arc::from(rebuilt);
            Ok::<(), ManagerError>(())
        })?;
        tracing::info!(strategy = name, "strategy reconfigured");
        Ok(())
    }

    /// Apply `f` to a copy of the registry and publish it as the next version.
    fn mutate<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        match self.try_mutate(|registry| Ok::<R, Infallible>(f(registry))) {
            Ok(out) => out,
            Err(never) => match never {},
        }
    }

    /// Like `mutate`, but an `Err` from `f` discards the copy and leaves the
    /// published version untouched.
    fn try_mutate<R, E>(&self, f: impl FnOnce(&mut Registry) -> Result<R, E>) -> Result<R, E> {
        let mut guard = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = (*guard.strategies).clone();
        let out = f(&mut next)?;
        guard.strategies = Arc::new(next);
        guard.version += 1;
        Ok(out)
    }
}

impl Default for StrategyManager {
    /// The three built-in strategies with default parameters.
    fn default() -> Self {
        let mut strategies = Registry::new();
        strategies.insert(
            "ma_cross".to_string(),
            Arc::new(MovingAverageCross::default()) as Arc<dyn Strategy>,
        );
        strategies.insert(
            "dynamic_dca".to_string(),
            Arc::new(DynamicPercentile::default()) as Arc<dyn Strategy>,
        );
        strategies.insert(
            "trend_following".to_string(),
            Arc::new(TrendFollowing::default()) as Arc<dyn Strategy>,
        );
        Self::from_registry(strategies, ConsensusConfig::default(), true)
    }
}

/// Run a strategy, converting a panic into a failure record.
fn run_isolated(
    name: &str,
    strategy: &dyn Strategy,
    series: &NavSeries,
) -> Result<StrategySignal, StrategyFailure> {
    panic::catch_unwind(AssertUnwindSafe(|| strategy.compute_signal(series))).map_err(|payload| {
        StrategyFailure {
            name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
