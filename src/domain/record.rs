//! Daily cumulative-return records and the aligned history built from them.

use crate::domain::error::SimulationError;
use crate::domain::universe::Universe;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One trading day's cumulative return per asset, in universe symbol order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub cumulative_returns: Vec<Decimal>,
}

/// The benchmark index's cumulative return for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub date: NaiveDate,
    pub cumulative_return: Decimal,
}

/// Asset and benchmark records, co-indexed by day.
///
/// Construction checks the alignment once; nothing hands out mutable access
/// afterwards, so every evaluation sees the same data.
#[derive(Debug, Clone)]
pub struct History {
    universe: Universe,
    records: Vec<ReturnRecord>,
    benchmark: Vec<BenchmarkRecord>,
}

impl History {
    pub fn new(
        universe: Universe,
        records: Vec<ReturnRecord>,
        benchmark: Vec<BenchmarkRecord>,
    ) -> Result<Self, SimulationError> {
        if records.is_empty() || benchmark.is_empty() {
            return Err(SimulationError::EmptyHistory);
        }
        if records.len() != benchmark.len() {
            return Err(SimulationError::MisalignedHistory {
                reason: format!(
                    "{} return records but {} benchmark records",
                    records.len(),
                    benchmark.len()
                ),
            });
        }

        for (i, (record, bench)) in records.iter().zip(&benchmark).enumerate() {
            if record.date != bench.date {
                return Err(SimulationError::MisalignedHistory {
                    reason: format!(
                        "row {i}: asset date {} does not match benchmark date {}",
                        record.date, bench.date
                    ),
                });
            }
            if record.cumulative_returns.len() != universe.count() {
                return Err(SimulationError::MisalignedHistory {
                    reason: format!(
                        "row {i} ({}): {} returns for {} symbols",
                        record.date,
                        record.cumulative_returns.len(),
                        universe.count()
                    ),
                });
            }
            if i > 0 && records[i - 1].date >= record.date {
                return Err(SimulationError::MisalignedHistory {
                    reason: format!("dates not strictly ascending at {}", record.date),
                });
            }
        }

        Ok(Self {
            universe,
            records,
            benchmark,
        })
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn symbols(&self) -> &[String] {
        &self.universe.symbols
    }

    pub fn asset_count(&self) -> usize {
        self.universe.count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReturnRecord] {
        &self.records
    }

    pub fn benchmark(&self) -> &[BenchmarkRecord] {
        &self.benchmark
    }

    pub fn days(&self) -> impl Iterator<Item = (&ReturnRecord, &BenchmarkRecord)> {
        self.records.iter().zip(&self.benchmark)
    }
}
