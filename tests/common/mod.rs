#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sharpefolio::domain::error::SimulationError;
use sharpefolio::domain::record::{BenchmarkRecord, History, ReturnRecord};
use sharpefolio::domain::universe::Universe;
use sharpefolio::domain::writeback::DailyResult;
use sharpefolio::ports::result_port::ResultPort;
use sharpefolio::ports::returns_port::ReturnsPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// Column-oriented returns keyed by symbol, all sharing one date axis.
pub struct MockReturnsPort {
    pub dates: Vec<NaiveDate>,
    pub columns: HashMap<String, Vec<Decimal>>,
    pub benchmark_dates: Option<Vec<NaiveDate>>,
    pub error: Option<String>,
}

impl MockReturnsPort {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: HashMap::new(),
            benchmark_dates: None,
            error: None,
        }
    }

    pub fn with_column(mut self, symbol: &str, values: Vec<Decimal>) -> Self {
        self.columns.insert(symbol.to_string(), values);
        self
    }

    pub fn with_benchmark_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.benchmark_dates = Some(dates);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn column(&self, symbol: &str) -> Result<&Vec<Decimal>, SimulationError> {
        if let Some(reason) = &self.error {
            return Err(SimulationError::Database {
                reason: reason.clone(),
            });
        }
        self.columns
            .get(symbol)
            .ok_or_else(|| SimulationError::DatabaseQuery {
                reason: format!("missing column {symbol}_Cumulative_Return"),
            })
    }
}

impl ReturnsPort for MockReturnsPort {
    fn fetch_asset_returns(
        &self,
        symbols: &[String],
    ) -> Result<Vec<ReturnRecord>, SimulationError> {
        let columns = symbols
            .iter()
            .map(|s| self.column(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .dates
            .iter()
            .enumerate()
            .map(|(i, &date)| ReturnRecord {
                date,
                cumulative_returns: columns.iter().map(|c| c[i]).collect(),
            })
            .collect())
    }

    fn fetch_benchmark_returns(
        &self,
        benchmark: &str,
    ) -> Result<Vec<BenchmarkRecord>, SimulationError> {
        let column = self.column(benchmark)?;
        let dates = self.benchmark_dates.as_ref().unwrap_or(&self.dates);
        Ok(dates
            .iter()
            .zip(column)
            .map(|(&date, &cumulative_return)| BenchmarkRecord {
                date,
                cumulative_return,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MockResultPort {
    pub rows: RefCell<Vec<DailyResult>>,
    pub fail: bool,
}

impl MockResultPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }
}

impl ResultPort for MockResultPort {
    fn write_day(&self, row: &DailyResult) -> Result<(), SimulationError> {
        if self.fail {
            return Err(SimulationError::DatabaseQuery {
                reason: "write rejected".into(),
            });
        }
        self.rows.borrow_mut().push(row.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn trading_days(count: usize) -> Vec<NaiveDate> {
    let start = date(2018, 1, 2);
    (0..count)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn four_symbols() -> Vec<String> {
    ["GOOG", "CELG", "NVDA", "FB"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn universe(symbols: Vec<String>) -> Universe {
    Universe {
        symbols,
        benchmark: "SPY".to_string(),
    }
}

/// Six days where every asset gains at least 0.10 per day and the benchmark 0.02, so
/// every grid candidate has a positive first delta and a non-zero deviation.
pub fn sample_port() -> MockReturnsPort {
    MockReturnsPort::new(trading_days(6))
        .with_column(
            "GOOG",
            vec![dec!(0.10), dec!(0.25), dec!(0.40), dec!(0.90), dec!(1.00), dec!(1.60)],
        )
        .with_column(
            "CELG",
            vec![dec!(0.20), dec!(0.30), dec!(0.55), dec!(0.65), dec!(0.95), dec!(1.05)],
        )
        .with_column(
            "NVDA",
            vec![dec!(0.05), dec!(0.50), dec!(0.60), dec!(0.70), dec!(1.20), dec!(1.30)],
        )
        .with_column(
            "FB",
            vec![dec!(0.30), dec!(0.40), dec!(0.50), dec!(0.60), dec!(0.70), dec!(0.80)],
        )
        .with_column(
            "SPY",
            vec![dec!(0.02), dec!(0.04), dec!(0.06), dec!(0.08), dec!(0.10), dec!(0.12)],
        )
}

pub fn sample_history() -> History {
    let port = sample_port();
    let symbols = four_symbols();
    History::new(
        universe(symbols.clone()),
        port.fetch_asset_returns(&symbols).unwrap(),
        port.fetch_benchmark_returns("SPY").unwrap(),
    )
    .unwrap()
}

/// The two-day reference history: four equally weighted assets against the benchmark.
pub fn reference_port() -> MockReturnsPort {
    MockReturnsPort::new(trading_days(2))
        .with_column("GOOG", vec![dec!(0.10), dec!(0.20)])
        .with_column("CELG", vec![dec!(0.05), dec!(0.10)])
        .with_column("NVDA", vec![dec!(0.00), dec!(0.05)])
        .with_column("FB", vec![dec!(0.05), dec!(0.05)])
        .with_column("SPY", vec![dec!(0.05), dec!(0.08)])
}

pub fn sample_csv() -> String {
    let port = sample_port();
    let symbols = ["GOOG", "CELG", "NVDA", "FB", "SPY"];
    let mut out = String::from("date");
    for s in symbols {
        out.push_str(&format!(",{s}_Cumulative_Return"));
    }
    out.push('\n');
    for (i, d) in port.dates.iter().enumerate() {
        out.push_str(&d.format("%Y-%m-%d").to_string());
        for s in symbols {
            out.push_str(&format!(",{}", port.columns[s][i]));
        }
        out.push('\n');
    }
    out
}
