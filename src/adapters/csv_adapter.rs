//! CSV returns/result adapter.
//!
//! Reads a returns file with header `date,<SYM>_Cumulative_Return,...` and writes
//! daily result rows to a separate output file.

use crate::domain::config_validation::DEFAULT_OUTPUT_PATH;
use crate::domain::error::SimulationError;
use crate::domain::record::{BenchmarkRecord, ReturnRecord};
use crate::domain::writeback::DailyResult;
use crate::ports::config_port::ConfigPort;
use crate::ports::result_port::ResultPort;
use crate::ports::returns_port::ReturnsPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    returns_path: PathBuf,
    output_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(returns_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            returns_path,
            output_path,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SimulationError> {
        let returns_path = config.get_string("csv", "returns_path").ok_or_else(|| {
            SimulationError::ConfigMissing {
                section: "csv".into(),
                key: "returns_path".into(),
            }
        })?;
        let output_path = config
            .get_string("csv", "output_path")
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
        Ok(Self::new(
            PathBuf::from(returns_path.trim()),
            PathBuf::from(output_path.trim()),
        ))
    }

    /// Rows of `(date, values)` for the named `<SYM>_Cumulative_Return` columns, sorted by date.
    fn read_columns(
        &self,
        symbols: &[&str],
    ) -> Result<Vec<(NaiveDate, Vec<Decimal>)>, SimulationError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.returns_path)
            .map_err(|e| SimulationError::Database {
                reason: format!("failed to read {}: {}", self.returns_path.display(), e),
            })?;

        let headers = rdr
            .headers()
            .map_err(|e| SimulationError::Database {
                reason: format!("CSV parse error: {}", e),
            })?
            .clone();
        let indices = symbols
            .iter()
            .map(|symbol| {
                let name = format!("{symbol}_Cumulative_Return");
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(&name))
                    .ok_or_else(|| SimulationError::Database {
                        reason: format!("missing column {name}"),
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SimulationError::Database {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).unwrap_or_default();
            if date_str.is_empty() {
                tracing::warn!(line = ?record.position().map(|p| p.line()), "skipping row without date");
                continue;
            }
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SimulationError::Database {
                    reason: format!("invalid date format '{}': {}", date_str, e),
                }
            })?;

            let values = indices
                .iter()
                .zip(symbols)
                .map(|(&i, symbol)| {
                    let raw = record.get(i).unwrap_or_default();
                    Decimal::from_str(raw).map_err(|e| SimulationError::Database {
                        reason: format!("invalid {} return '{}' on {}: {}", symbol, raw, date, e),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push((date, values));
        }

        rows.sort_by_key(|(date, _)| *date);
        tracing::debug!(rows = rows.len(), path = %self.returns_path.display(), "read returns file");
        Ok(rows)
    }

    fn write_rows(&self, rows: &[DailyResult], append: bool) -> Result<(), SimulationError> {
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let needs_header = !append
            || std::fs::metadata(&self.output_path)
                .map(|m| m.len() == 0)
                .unwrap_or(true);
        let file = if append {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.output_path)?
        } else {
            File::create(&self.output_path)?
        };

        let mut wtr = csv::Writer::from_writer(file);
        if needs_header {
            wtr.write_record(header(first)).map_err(write_error)?;
        }
        for row in rows {
            wtr.write_record(fields(row)).map_err(write_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReturnsPort for CsvAdapter {
    fn fetch_asset_returns(
        &self,
        symbols: &[String],
    ) -> Result<Vec<ReturnRecord>, SimulationError> {
        let names: Vec<&str> = symbols.iter().map(String::as_str).collect();
        Ok(self
            .read_columns(&names)?
            .into_iter()
            .map(|(date, cumulative_returns)| ReturnRecord {
                date,
                cumulative_returns,
            })
            .collect())
    }

    fn fetch_benchmark_returns(
        &self,
        benchmark: &str,
    ) -> Result<Vec<BenchmarkRecord>, SimulationError> {
        Ok(self
            .read_columns(&[benchmark])?
            .into_iter()
            .map(|(date, values)| BenchmarkRecord {
                date,
                cumulative_return: values.into_iter().next().unwrap_or_default(),
            })
            .collect())
    }
}

impl ResultPort for CsvAdapter {
    fn write_day(&self, row: &DailyResult) -> Result<(), SimulationError> {
        self.write_rows(std::slice::from_ref(row), true)
    }

    /// A run replaces any previous output.
    fn write_run(&self, rows: &[DailyResult]) -> Result<(), SimulationError> {
        self.write_rows(rows, false)?;
        tracing::debug!(rows = rows.len(), path = %self.output_path.display(), "wrote results file");
        Ok(())
    }
}

fn header(row: &DailyResult) -> Vec<String> {
    let mut names = vec!["date".to_string()];
    names.extend(row.asset_values.iter().map(|a| format!("{}_Value", a.symbol)));
    names.push(format!("{}_Value", row.benchmark_symbol));
    names.push("Portfolio_Cumulative_Return".to_string());
    names.push("Portfolio_Value".to_string());
    names.push("Ra_Rb".to_string());
    names
}

fn fields(row: &DailyResult) -> Vec<String> {
    let mut values = vec![row.date.format("%Y-%m-%d").to_string()];
    values.extend(row.asset_values.iter().map(|a| a.dollars.clone()));
    values.push(row.benchmark_dollars.clone());
    values.push(row.portfolio_return.to_string());
    values.push(row.portfolio_dollars.clone());
    values.push(row.benchmark_delta.to_string());
    values
}

fn write_error(e: csv::Error) -> SimulationError {
    SimulationError::Database {
        reason: format!("CSV write error: {}", e),
    }
}
