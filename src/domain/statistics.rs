//! Summary statistics over a benchmark-delta series.
//!
//! All arithmetic is exact decimal. Divisions round half-up to the dividend's scale;
//! square roots keep [`SQRT_PRECISION`](super::precision::SQRT_PRECISION) significant
//! digits.

use super::error::StatisticsError;
use super::precision::{divide_half_up, sqrt_rounded};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsResult {
    pub mean: Decimal,
    pub standard_deviation: Decimal,
    pub sharpe_ratio: Decimal,
    pub overall_cumulative_return: Decimal,
}

/// The subset of statistics the allocation search ranks candidates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskSummary {
    pub mean: Decimal,
    pub standard_deviation: Decimal,
    pub sharpe_ratio: Decimal,
}

impl RiskSummary {
    pub fn compute(deltas: &[Decimal]) -> Result<Self, StatisticsError> {
        let mean = mean(deltas)?;
        let standard_deviation = population_std_dev(deltas, mean)?;
        let sharpe_ratio = sharpe_ratio(deltas.len(), mean, standard_deviation)?;
        Ok(Self {
            mean,
            standard_deviation,
            sharpe_ratio,
        })
    }
}

impl StatisticsResult {
    pub fn compute(deltas: &[Decimal]) -> Result<Self, StatisticsError> {
        let risk = RiskSummary::compute(deltas)?;
        let overall_cumulative_return = overall_cumulative_return(deltas)?;
        Ok(Self {
            mean: risk.mean,
            standard_deviation: risk.standard_deviation,
            sharpe_ratio: risk.sharpe_ratio,
            overall_cumulative_return,
        })
    }
}

pub fn mean(deltas: &[Decimal]) -> Result<Decimal, StatisticsError> {
    if deltas.is_empty() {
        return Err(StatisticsError::EmptySeries);
    }
    let sum: Decimal = deltas.iter().sum();
    divide_half_up(sum, Decimal::from(deltas.len()))
        .ok_or(StatisticsError::Arithmetic { operation: "mean" })
}

/// Population standard deviation (denominator n) around a precomputed mean.
pub fn population_std_dev(deltas: &[Decimal], mean: Decimal) -> Result<Decimal, StatisticsError> {
    if deltas.is_empty() {
        return Err(StatisticsError::EmptySeries);
    }
    let squares: Decimal = deltas
        .iter()
        .map(|d| {
            let diff = d - mean;
            diff * diff
        })
        .sum();
    let variance = divide_half_up(squares, Decimal::from(deltas.len())).ok_or(
        StatisticsError::Arithmetic {
            operation: "variance",
        },
    )?;
    sqrt_rounded(variance)
}

/// `sqrt(n) * mean / standard_deviation`.
pub fn sharpe_ratio(
    n: usize,
    mean: Decimal,
    standard_deviation: Decimal,
) -> Result<Decimal, StatisticsError> {
    if standard_deviation.is_zero() {
        return Err(StatisticsError::ZeroStandardDeviation);
    }
    let root_n = sqrt_rounded(Decimal::from(n))?;
    divide_half_up(root_n * mean, standard_deviation).ok_or(StatisticsError::Arithmetic {
        operation: "sharpe ratio",
    })
}

/// `(d_last - d_first) / d_first`.
pub fn overall_cumulative_return(deltas: &[Decimal]) -> Result<Decimal, StatisticsError> {
    let (first, last) = match (deltas.first(), deltas.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(StatisticsError::EmptySeries),
    };
    if first.is_zero() {
        return Err(StatisticsError::ZeroFirstDelta);
    }
    divide_half_up(last - first, first).ok_or(StatisticsError::Arithmetic {
        operation: "overall cumulative return",
    })
}
