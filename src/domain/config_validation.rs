//! Configuration validation.
//!
//! Validates the `[simulation]`, `[source]`, `[sqlite]` and `[csv]` sections before
//! any history is loaded.

use crate::domain::allocation::parse_allocation;
use crate::domain::error::SimulationError;
use crate::domain::universe::{check_allowed, parse_symbols};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_TABLE: &str = "Analysis";
pub const DEFAULT_OUTPUT_PATH: &str = "results.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sqlite,
    Csv,
}

impl SourceKind {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SimulationError> {
        match config.get_string("source", "kind") {
            None => Ok(SourceKind::Sqlite),
            Some(s) => match s.trim().to_lowercase().as_str() {
                "sqlite" => Ok(SourceKind::Sqlite),
                "csv" => Ok(SourceKind::Csv),
                other => Err(SimulationError::ConfigInvalid {
                    section: "source".to_string(),
                    key: "kind".to_string(),
                    reason: format!("unknown source kind '{other}', expected sqlite or csv"),
                }),
            },
        }
    }
}

/// Column-name fragments are interpolated into SQL, so only `[A-Za-z0-9_]` is allowed.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn benchmark_symbol(config: &dyn ConfigPort) -> String {
    config
        .get_string("simulation", "benchmark")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), SimulationError> {
    let symbols = match config.get_string("simulation", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s)?,
        _ => {
            return Err(SimulationError::ConfigMissing {
                section: "simulation".to_string(),
                key: "symbols".to_string(),
            })
        }
    };

    if let Some(universe) = config.get_string("simulation", "universe") {
        if !universe.trim().is_empty() {
            check_allowed(&symbols, &parse_symbols(&universe)?)?;
        }
    }

    if let Some(weights) = config.get_string("simulation", "weights") {
        parse_allocation(&weights, symbols.len())?;
    }

    let benchmark = benchmark_symbol(config);
    if !is_valid_identifier(&benchmark) {
        return Err(SimulationError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "benchmark".to_string(),
            reason: format!("'{benchmark}' is not a valid column prefix"),
        });
    }
    Ok(())
}

pub fn validate_source_config(config: &dyn ConfigPort) -> Result<(), SimulationError> {
    match SourceKind::from_config(config)? {
        SourceKind::Sqlite => validate_sqlite(config),
        SourceKind::Csv => validate_csv(config),
    }
}

fn validate_sqlite(config: &dyn ConfigPort) -> Result<(), SimulationError> {
    require_non_empty(config, "sqlite", "path")?;

    let pool_size = config.get_int("sqlite", "pool_size", 4);
    if pool_size < 1 {
        return Err(SimulationError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be at least 1".to_string(),
        });
    }

    if let Some(table) = config.get_string("sqlite", "table") {
        if !is_valid_identifier(table.trim()) {
            return Err(SimulationError::ConfigInvalid {
                section: "sqlite".to_string(),
                key: "table".to_string(),
                reason: format!("'{table}' is not a valid table name"),
            });
        }
    }
    Ok(())
}

fn validate_csv(config: &dyn ConfigPort) -> Result<(), SimulationError> {
    require_non_empty(config, "csv", "returns_path")?;
    Ok(())
}

fn require_non_empty(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SimulationError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SimulationError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
