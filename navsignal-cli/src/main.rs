//! NavSignal CLI — compute strategy signals and consensus for a fund NAV series.
//!
//! Commands:
//! - `signals` — per-strategy signals (all registered, or one with `--strategy`)
//! - `consensus` — per-strategy signals plus their weighted consensus
//! - `describe` — parameters and signal meanings of every registered strategy
//! - `demo` — run the full evaluation over a seeded synthetic series
//!
//! Results are printed as pretty JSON on stdout; logs go to stderr
//! (`RUST_LOG` controls the level, default `info`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use navsignal_core::config::EngineConfig;
use navsignal_core::data::{read_nav_csv, write_nav_csv};
use navsignal_core::domain::NavSeries;
use navsignal_core::manager::StrategyManager;
use navsignal_core::synthetic::random_walk;

#[derive(Parser)]
#[command(
    name = "navsignal",
    about = "NavSignal CLI — multi-strategy signal engine for fund NAV series"
)]
struct Cli {
    /// NAV series CSV (date,unit_value[,accumulated_value][,daily_return][,volume]).
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Engine config TOML. Defaults to the three built-in strategies.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate strategies one at a time instead of in parallel.
    #[arg(long, global = true, default_value_t = false)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-strategy signals for the series in --csv.
    Signals {
        /// Only run this registered strategy.
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Per-strategy signals plus their weighted consensus.
    Consensus {
        /// Strategy weight as NAME=VALUE. Repeatable; overrides configured weights.
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
    },
    /// Describe every registered strategy.
    Describe,
    /// Evaluate a seeded synthetic series.
    Demo {
        /// Number of daily observations.
        #[arg(long, default_value_t = 500)]
        len: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Also write the generated series to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manager = build_manager(cli.config.as_deref(), cli.sequential)?;

    match cli.command {
        Commands::Signals { strategy } => {
            let series = load_series(cli.csv.as_deref())?;
            run_signals(&manager, &series, strategy.as_deref())
        }
        Commands::Consensus { weights } => {
            let series = load_series(cli.csv.as_deref())?;
            run_consensus(&manager, &series, weights)
        }
        Commands::Describe => print_json(&manager.get_strategy_descriptions()),
        Commands::Demo { len, seed, output } => run_demo(&manager, len, seed, output.as_deref()),
    }
}

fn build_manager(config_path: Option<&Path>, sequential: bool) -> Result<StrategyManager> {
    let config = match config_path {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    let manager = StrategyManager::new(&config)?;
    tracing::info!(
        strategies = ?manager.strategy_names(),
        parallel = config.parallel && !sequential,
        "engine ready"
    );
    Ok(if sequential {
        manager.with_parallelism(false)
    } else {
        manager
    })
}

fn load_series(csv: Option<&Path>) -> Result<NavSeries> {
    let Some(path) = csv else {
        bail!("--csv is required for this command (or use `demo` for synthetic data)");
    };
    let series = read_nav_csv(path).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        observations = series.len(),
        as_of = ?series.as_of(),
        has_volume = series.has_volume(),
        "series loaded"
    );
    Ok(series)
}

fn run_signals(manager: &StrategyManager, series: &NavSeries, strategy: Option<&str>) -> Result<()> {
    match strategy {
        Some(name) => {
            let signal = manager.calculate_signal(name, series)?;
            print_json(&BTreeMap::from([(name, signal)]))
        }
        None => print_json(&manager.calculate_all_signals(series)),
    }
}

fn run_consensus(
    manager: &StrategyManager,
    series: &NavSeries,
    weights: Vec<(String, f64)>,
) -> Result<()> {
    let weights: BTreeMap<String, f64> = weights.into_iter().collect();
    for name in weights.keys() {
        if manager.get_strategy(name).is_none() {
            tracing::warn!(strategy = %name, "weight given for an unregistered strategy");
        }
    }
    let overrides = (!weights.is_empty()).then_some(&weights);
    print_json(&manager.evaluate(series, overrides))
}

fn run_demo(manager: &StrategyManager, len: usize, seed: u64, output: Option<&Path>) -> Result<()> {
    let series = random_walk(len, seed);
    if let Some(path) = output {
        std::fs::write(path, write_nav_csv(&series)?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "synthetic series written");
    }
    print_json(&manager.evaluate(&series, None))
}

fn parse_weight(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{value}': {e}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("weight must be a finite number >= 0, got {value}"));
    }
    Ok((name.trim().to_string(), value))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_parse() {
        assert_eq!(parse_weight("ma_cross=2").unwrap(), ("ma_cross".to_string(), 2.0));
        assert_eq!(parse_weight(" dca = 0.5 ").unwrap(), ("dca".to_string(), 0.5));
        assert!(parse_weight("ma_cross").is_err());
        assert!(parse_weight("ma_cross=abc").is_err());
        assert!(parse_weight("ma_cross=-1").is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "navsignal",
            "consensus",
            "--csv",
            "nav.csv",
            "--weight",
            "ma_cross=2",
            "--weight",
            "dynamic_dca=1",
        ])
        .unwrap();
        assert_eq!(cli.csv, Some(PathBuf::from("nav.csv")));
        match cli.command {
            Commands::Consensus { weights } => assert_eq!(weights.len(), 2),
            _ => panic!("expected consensus"),
        }
    }

    #[test]
    fn missing_csv_is_an_error() {
        assert!(load_series(None).is_err());
    }
}
