//! Weighted daily portfolio values and benchmark deltas.

use crate::domain::allocation::AllocationVector;
use crate::domain::error::SimulationError;
use crate::domain::precision::round_significant;
use crate::domain::record::{BenchmarkRecord, History, ReturnRecord};
use rust_decimal::Decimal;

/// Significant digits kept for daily values at or below 1.0.
const SMALL_VALUE_DIGITS: u32 = 2;
/// Significant digits kept for daily values above 1.0.
const LARGE_VALUE_DIGITS: u32 = 3;

/// Σ weight[i] * return[i], rounded to 3 significant digits when the sum exceeds 1.0
/// and to 2 otherwise.
pub fn daily_portfolio_value(
    record: &ReturnRecord,
    weights: &AllocationVector,
) -> Result<Decimal, SimulationError> {
    check_len(record, weights)?;
    let raw: Decimal = record
        .cumulative_returns
        .iter()
        .zip(weights.weights())
        .map(|(r, w)| r * w)
        .sum();

    let digits = if raw > Decimal::ONE {
        LARGE_VALUE_DIGITS
    } else {
        SMALL_VALUE_DIGITS
    };
    Ok(round_significant(raw, digits)?)
}

pub fn benchmark_delta(daily_value: Decimal, benchmark: &BenchmarkRecord) -> Decimal {
    daily_value - benchmark.cumulative_return
}

/// Unrounded weighted return of a single asset.
pub fn weighted_asset_value(
    record: &ReturnRecord,
    weights: &AllocationVector,
    index: usize,
) -> Result<Decimal, SimulationError> {
    check_len(record, weights)?;
    match (record.cumulative_returns.get(index), weights.weights().get(index)) {
        (Some(r), Some(w)) => Ok(r * w),
        _ => Err(SimulationError::WeightCountMismatch {
            expected: index + 1,
            actual: weights.len(),
        }),
    }
}

/// Daily values and benchmark deltas across a whole history.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub values: Vec<Decimal>,
    pub deltas: Vec<Decimal>,
}

pub fn daily_series(
    history: &History,
    weights: &AllocationVector,
) -> Result<DailySeries, SimulationError> {
    let mut values = Vec::with_capacity(history.len());
    let mut deltas = Vec::with_capacity(history.len());
    for (record, bench) in history.days() {
        let value = daily_portfolio_value(record, weights)?;
        values.push(value);
        deltas.push(benchmark_delta(value, bench));
    }
    Ok(DailySeries { values, deltas })
}

fn check_len(record: &ReturnRecord, weights: &AllocationVector) -> Result<(), SimulationError> {
    if record.cumulative_returns.len() != weights.len() {
        return Err(SimulationError::WeightCountMismatch {
            expected: record.cumulative_returns.len(),
            actual: weights.len(),
        });
    }
    Ok(())
}
