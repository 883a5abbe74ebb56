//! SQLite returns/result adapter.
//!
//! One wide table keyed by `date`: an input column `<SYM>_Cumulative_Return` per asset
//! and for the benchmark, plus the write-back columns `<SYM>_Value`, `<BENCH>_Value`,
//! `Portfolio_Cumulative_Return`, `Portfolio_Value` and `Ra_Rb`. Decimals are stored as
//! TEXT so they round-trip exactly.

use crate::domain::config_validation::{is_valid_identifier, DEFAULT_TABLE};
use crate::domain::error::SimulationError;
use crate::domain::record::{BenchmarkRecord, ReturnRecord};
use crate::domain::writeback::DailyResult;
use crate::ports::config_port::ConfigPort;
use crate::ports::result_port::ResultPort;
use crate::ports::returns_port::ReturnsPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;

const CUMULATIVE_RETURN_SUFFIX: &str = "_Cumulative_Return";
const VALUE_SUFFIX: &str = "_Value";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
    table: String,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SimulationError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SimulationError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;
        let table = config
            .get_string("sqlite", "table")
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        if !is_valid_identifier(&table) {
            return Err(SimulationError::ConfigInvalid {
                section: "sqlite".into(),
                key: "table".into(),
                reason: format!("'{table}' is not a valid table name"),
            });
        }

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        tracing::debug!(path = %db_path, table = %table, pool_size, "opened sqlite database");
        Ok(Self { pool, table })
    }

    pub fn in_memory() -> Result<Self, SimulationError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self {
            pool,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    /// Create the table with input and write-back columns for `symbols` and `benchmark`.
    pub fn initialize_schema(
        &self,
        symbols: &[String],
        benchmark: &str,
    ) -> Result<(), SimulationError> {
        let mut columns = vec!["date TEXT PRIMARY KEY".to_string()];
        for symbol in symbols.iter().map(String::as_str).chain([benchmark]) {
            columns.push(format!("{} TEXT", column(symbol, CUMULATIVE_RETURN_SUFFIX)?));
            columns.push(format!("{} TEXT", column(symbol, VALUE_SUFFIX)?));
        }
        columns.push("Portfolio_Cumulative_Return TEXT".to_string());
        columns.push("Portfolio_Value TEXT".to_string());
        columns.push("Ra_Rb TEXT".to_string());

        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.table,
            columns.join(", ")
        ))
        .map_err(query_error)?;
        Ok(())
    }

    /// Seed cumulative returns for `symbols` and `benchmark`, one row per record.
    pub fn insert_returns(
        &self,
        symbols: &[String],
        records: &[ReturnRecord],
        benchmark: &str,
        benchmark_records: &[BenchmarkRecord],
    ) -> Result<(), SimulationError> {
        if records.len() != benchmark_records.len() {
            return Err(SimulationError::MisalignedHistory {
                reason: format!(
                    "{} return records but {} benchmark records",
                    records.len(),
                    benchmark_records.len()
                ),
            });
        }

        let mut names = vec!["date".to_string()];
        for symbol in symbols.iter().map(String::as_str).chain([benchmark]) {
            names.push(column(symbol, CUMULATIVE_RETURN_SUFFIX)?);
        }
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            self.table,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        for (record, bench) in records.iter().zip(benchmark_records) {
            let mut values = vec![record.date.format(DATE_FORMAT).to_string()];
            values.extend(record.cumulative_returns.iter().map(Decimal::to_string));
            values.push(bench.cumulative_return.to_string());
            tx.execute(&sql, params_from_iter(values))
                .map_err(query_error)?;
        }
        tx.commit().map_err(query_error)?;

        tracing::debug!(rows = records.len(), table = %self.table, "inserted return rows");
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, SimulationError> {
        self.pool.get().map_err(pool_error)
    }

    fn update_sql(&self, row: &DailyResult) -> Result<String, SimulationError> {
        let mut assignments = Vec::with_capacity(row.asset_values.len() + 4);
        for asset in &row.asset_values {
            assignments.push(format!("{} = ?", column(&asset.symbol, VALUE_SUFFIX)?));
        }
        assignments.push(format!("{} = ?", column(&row.benchmark_symbol, VALUE_SUFFIX)?));
        assignments.push("Portfolio_Cumulative_Return = ?".to_string());
        assignments.push("Portfolio_Value = ?".to_string());
        assignments.push("Ra_Rb = ?".to_string());

        Ok(format!(
            "UPDATE {} SET {} WHERE date = ?",
            self.table,
            assignments.join(", ")
        ))
    }

    fn update_row(&self, conn: &Connection, row: &DailyResult) -> Result<(), SimulationError> {
        let sql = self.update_sql(row)?;
        let mut values: Vec<String> = row.asset_values.iter().map(|a| a.dollars.clone()).collect();
        values.push(row.benchmark_dollars.clone());
        values.push(row.portfolio_return.to_string());
        values.push(row.portfolio_dollars.clone());
        values.push(row.benchmark_delta.to_string());
        values.push(row.date.format(DATE_FORMAT).to_string());

        let updated = conn
            .execute(&sql, params_from_iter(values))
            .map_err(query_error)?;
        if updated == 0 {
            return Err(SimulationError::DatabaseQuery {
                reason: format!("no row dated {} in {}", row.date, self.table),
            });
        }
        Ok(())
    }

    fn select_columns<T>(
        &self,
        columns: &[String],
        mut build: impl FnMut(NaiveDate, Vec<Decimal>) -> T,
    ) -> Result<Vec<T>, SimulationError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT date, {} FROM {} ORDER BY date ASC",
            columns.join(", "),
            self.table
        );
        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let mut rows = stmt.query([]).map_err(query_error)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let date_str: String = row.get(0).map_err(query_error)?;
            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
                SimulationError::DatabaseQuery {
                    reason: format!("invalid date '{date_str}': {e}"),
                }
            })?;

            let mut values = Vec::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let value = row.get_ref(i + 1).map_err(query_error)?;
                values.push(decimal_from_sql(value, name, date)?);
            }
            out.push(build(date, values));
        }

        tracing::debug!(rows = out.len(), table = %self.table, "fetched rows");
        Ok(out)
    }
}

impl ReturnsPort for SqliteAdapter {
    fn fetch_asset_returns(
        &self,
        symbols: &[String],
    ) -> Result<Vec<ReturnRecord>, SimulationError> {
        let columns = symbols
            .iter()
            .map(|s| column(s, CUMULATIVE_RETURN_SUFFIX))
            .collect::<Result<Vec<_>, _>>()?;
        self.select_columns(&columns, |date, cumulative_returns| ReturnRecord {
            date,
            cumulative_returns,
        })
    }

    fn fetch_benchmark_returns(
        &self,
        benchmark: &str,
    ) -> Result<Vec<BenchmarkRecord>, SimulationError> {
        let columns = [column(benchmark, CUMULATIVE_RETURN_SUFFIX)?];
        self.select_columns(&columns, |date, values| BenchmarkRecord {
            date,
            cumulative_return: values.into_iter().next().unwrap_or_default(),
        })
    }
}

impl ResultPort for SqliteAdapter {
    fn write_day(&self, row: &DailyResult) -> Result<(), SimulationError> {
        let conn = self.conn()?;
        self.update_row(&conn, row)
    }

    /// All rows of a run commit together.
    fn write_run(&self, rows: &[DailyResult]) -> Result<(), SimulationError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        for row in rows {
            self.update_row(&tx, row)?;
        }
        tx.commit().map_err(query_error)?;
        tracing::debug!(rows = rows.len(), table = %self.table, "committed run");
        Ok(())
    }
}

fn column(symbol: &str, suffix: &str) -> Result<String, SimulationError> {
    if !is_valid_identifier(symbol) {
        return Err(SimulationError::DatabaseQuery {
            reason: format!("'{symbol}' cannot be used as a column prefix"),
        });
    }
    Ok(format!("{symbol}{suffix}"))
}

fn decimal_from_sql(
    value: ValueRef<'_>,
    column: &str,
    date: NaiveDate,
) -> Result<Decimal, SimulationError> {
    let invalid = |detail: String| SimulationError::DatabaseQuery {
        reason: format!("{column} on {date}: {detail}"),
    };
    match value {
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| invalid(e.to_string()))?;
            Decimal::from_str(text.trim()).map_err(|e| invalid(format!("'{text}': {e}")))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::try_from(f).map_err(|e| invalid(e.to_string())),
        ValueRef::Null => Err(invalid("missing value".to_string())),
        ValueRef::Blob(_) => Err(invalid("unexpected blob".to_string())),
    }
}

fn pool_error(e: r2d2::Error) -> SimulationError {
    SimulationError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> SimulationError {
    SimulationError::DatabaseQuery {
        reason: e.to_string(),
    }
}
