//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::{parse_allocation, AllocationVector};
use crate::domain::config_validation::{
    benchmark_symbol, validate_simulation_config, validate_source_config, SourceKind,
};
use crate::domain::error::SimulationError;
use crate::domain::search::feasible_count;
use crate::domain::simulator::{OptimizationResult, PortfolioSimulator};
use crate::domain::statistics::StatisticsResult;
use crate::domain::universe::{check_allowed, parse_symbols, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::result_port::ResultPort;
use crate::ports::returns_port::ReturnsPort;

#[derive(Parser, Debug)]
#[command(
    name = "sharpefolio",
    about = "Benchmark-relative portfolio simulator and Sharpe-ratio optimizer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate one allocation over the full history
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [simulation] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Comma-separated weights in tenths, overriding [simulation] weights
        #[arg(short, long)]
        weights: Option<String>,
    },
    /// Search the allocation grid for the best Sharpe ratio, then evaluate the winner
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the number of feasible grid allocations for a given asset count
    Grid {
        #[arg(long)]
        assets: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            symbols,
            weights,
        } => run_single(&config, symbols.as_deref(), weights.as_deref()),
        Command::Optimize { config, symbols } => run_optimize(&config, symbols.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Grid { assets } => {
            println!("{}", feasible_count(assets));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Where history is read from and daily rows are written to.
pub enum Store {
    #[cfg(feature = "sqlite")]
    Sqlite(crate::adapters::sqlite_adapter::SqliteAdapter),
    Csv(CsvAdapter),
}

impl Store {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SimulationError> {
        match SourceKind::from_config(config)? {
            #[cfg(feature = "sqlite")]
            SourceKind::Sqlite => Ok(Store::Sqlite(
                crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?,
            )),
            #[cfg(not(feature = "sqlite"))]
            SourceKind::Sqlite => Err(SimulationError::ConfigInvalid {
                section: "source".into(),
                key: "kind".into(),
                reason: "built without the sqlite feature".into(),
            }),
            SourceKind::Csv => Ok(Store::Csv(CsvAdapter::from_config(config)?)),
        }
    }

    pub fn returns(&self) -> &dyn ReturnsPort {
        match self {
            #[cfg(feature = "sqlite")]
            Store::Sqlite(a) => a,
            Store::Csv(a) => a,
        }
    }

    pub fn results(&self) -> &dyn ResultPort {
        match self {
            #[cfg(feature = "sqlite")]
            Store::Sqlite(a) => a,
            Store::Csv(a) => a,
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, SimulationError> {
    tracing::info!(file = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_simulation_config(&adapter)?;
    validate_source_config(&adapter)?;
    Ok(adapter)
}

/// Symbols from the override or `[simulation] symbols`, checked against any whitelist.
pub fn resolve_universe(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
) -> Result<Universe, SimulationError> {
    let raw = match symbols_override {
        Some(s) => s.to_string(),
        None => config.get_string("simulation", "symbols").ok_or_else(|| {
            SimulationError::ConfigMissing {
                section: "simulation".into(),
                key: "symbols".into(),
            }
        })?,
    };
    let symbols = parse_symbols(&raw)?;

    if let Some(allowed) = config
        .get_string("simulation", "universe")
        .filter(|s| !s.trim().is_empty())
    {
        check_allowed(&symbols, &parse_symbols(&allowed)?)?;
    }

    Ok(Universe {
        symbols,
        benchmark: benchmark_symbol(config),
    })
}

pub fn resolve_weights(
    config: &dyn ConfigPort,
    weights_override: Option<&str>,
    assets: usize,
) -> Result<AllocationVector, SimulationError> {
    let raw = match weights_override {
        Some(w) => w.to_string(),
        None => config.get_string("simulation", "weights").ok_or_else(|| {
            SimulationError::ConfigMissing {
                section: "simulation".into(),
                key: "weights".into(),
            }
        })?,
    };
    Ok(parse_allocation(&raw, assets)?)
}

pub fn format_statistics(stats: &StatisticsResult) -> String {
    format!(
        "Mean:                      {}\n\
         Standard Deviation:        {}\n\
         Sharpe Ratio:              {}\n\
         Overall Cumulative Return: {}",
        stats.mean, stats.standard_deviation, stats.sharpe_ratio, stats.overall_cumulative_return
    )
}

pub fn format_allocation(symbols: &[String], allocation: &AllocationVector) -> String {
    allocation
        .label(symbols)
        .iter()
        .map(|a| format!("{}={}", a.symbol, a.weight))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_optimization(symbols: &[String], result: &OptimizationResult) -> String {
    format!(
        "{}\nBest Allocation:           {}\nCandidates Evaluated:      {}",
        format_statistics(&result.statistics),
        format_allocation(symbols, &result.allocation),
        result.evaluated
    )
}

fn run_single(
    config_path: &PathBuf,
    symbols: Option<&str>,
    weights: Option<&str>,
) -> Result<(), SimulationError> {
    let config = load_config(config_path)?;
    let universe = resolve_universe(&config, symbols)?;
    let allocation = resolve_weights(&config, weights, universe.count())?;
    let store = Store::from_config(&config)?;

    let simulator = PortfolioSimulator::load(store.returns(), universe, store.results())?;
    let stats = simulator.run_single(&allocation)?;

    println!(
        "Allocation:                {}",
        format_allocation(simulator.history().symbols(), &allocation)
    );
    println!("{}", format_statistics(&stats));
    Ok(())
}

fn run_optimize(config_path: &PathBuf, symbols: Option<&str>) -> Result<(), SimulationError> {
    let config = load_config(config_path)?;
    let universe = resolve_universe(&config, symbols)?;
    let store = Store::from_config(&config)?;

    let simulator = PortfolioSimulator::load(store.returns(), universe, store.results())?;
    let result = simulator.run_optimization()?;

    println!("{}", format_optimization(simulator.history().symbols(), &result));
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), SimulationError> {
    let config = load_config(config_path)?;
    let universe = resolve_universe(&config, None)?;
    let kind = SourceKind::from_config(&config)?;
    println!(
        "Configuration OK: {} symbols against {}, source {:?}",
        universe.count(),
        universe.benchmark,
        kind
    );
    Ok(())
}
