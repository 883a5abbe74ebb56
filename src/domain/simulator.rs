//! Portfolio simulator: single evaluations with write-back, and the full optimization.
//!
//! The simulator owns an immutable [`History`]. Weight vectors are passed explicitly to
//! every call, so evaluations never share scratch state. Only [`PortfolioSimulator::run_single`]
//! emits rows to the [`ResultPort`]; the search never persists intermediate candidates.

use crate::domain::allocation::AllocationVector;
use crate::domain::error::SimulationError;
use crate::domain::precision::format_dollars;
use crate::domain::record::History;
use crate::domain::returns::{daily_series, weighted_asset_value};
use crate::domain::search::AllocationSearch;
use crate::domain::statistics::StatisticsResult;
use crate::domain::universe::Universe;
use crate::domain::writeback::{AssetValue, DailyResult};
use crate::ports::result_port::ResultPort;
use crate::ports::returns_port::ReturnsPort;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub allocation: AllocationVector,
    pub statistics: StatisticsResult,
    pub evaluated: usize,
}

pub struct PortfolioSimulator<'a> {
    history: History,
    sink: &'a dyn ResultPort,
}

impl<'a> PortfolioSimulator<'a> {
    pub fn new(history: History, sink: &'a dyn ResultPort) -> Self {
        Self { history, sink }
    }

    /// Fetch and align the history for `universe`, then build a simulator over it.
    pub fn load(
        source: &dyn ReturnsPort,
        universe: Universe,
        sink: &'a dyn ResultPort,
    ) -> Result<Self, SimulationError> {
        let records = source.fetch_asset_returns(&universe.symbols)?;
        let benchmark = source.fetch_benchmark_returns(&universe.benchmark)?;
        tracing::debug!(
            days = records.len(),
            assets = universe.count(),
            "loaded return history"
        );
        let history = History::new(universe, records, benchmark)?;
        Ok(Self::new(history, sink))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn run_single(
        &self,
        weights: &AllocationVector,
    ) -> Result<StatisticsResult, SimulationError> {
        validate_weights(weights, self.history.asset_count())?;
        tracing::info!(allocation = %weights, days = self.history.len(), "running simulation");

        let series = daily_series(&self.history, weights)?;
        let rows = self.daily_rows(weights, &series.values, &series.deltas)?;
        self.sink.write_run(&rows)?;
        tracing::debug!(rows = rows.len(), "wrote daily results");

        let statistics = StatisticsResult::compute(&series.deltas)?;
        tracing::info!(
            mean = %statistics.mean,
            std_dev = %statistics.standard_deviation,
            sharpe = %statistics.sharpe_ratio,
            "simulation complete"
        );
        Ok(statistics)
    }

    pub fn run_optimization(&self) -> Result<OptimizationResult, SimulationError> {
        tracing::info!(assets = self.history.asset_count(), "starting allocation search");
        let outcome = AllocationSearch::new(&self.history).run()?;
        let statistics = self.run_single(&outcome.allocation)?;
        Ok(OptimizationResult {
            allocation: outcome.allocation,
            statistics,
            evaluated: outcome.evaluated,
        })
    }

    fn daily_rows(
        &self,
        weights: &AllocationVector,
        values: &[Decimal],
        deltas: &[Decimal],
    ) -> Result<Vec<DailyResult>, SimulationError> {
        let symbols = self.history.symbols();
        let benchmark_symbol = &self.history.universe().benchmark;

        self.history
            .days()
            .zip(values.iter().zip(deltas))
            .map(|((record, bench), (&value, &delta))| -> Result<DailyResult, SimulationError> {
                let asset_values = symbols
                    .iter()
                    .enumerate()
                    .map(|(i, symbol)| -> Result<AssetValue, SimulationError> {
                        Ok(AssetValue {
                            symbol: symbol.clone(),
                            dollars: format_dollars(weighted_asset_value(record, weights, i)?),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(DailyResult {
                    date: record.date,
                    asset_values,
                    benchmark_symbol: benchmark_symbol.clone(),
                    benchmark_dollars: format_dollars(bench.cumulative_return),
                    portfolio_return: value,
                    portfolio_dollars: format_dollars(value),
                    benchmark_delta: delta,
                })
            })
            .collect()
    }
}

/// Weights must match the asset count, lie in [0, 1] and total exactly 1.0.
pub fn validate_weights(weights: &AllocationVector, assets: usize) -> Result<(), SimulationError> {
    if weights.len() != assets {
        return Err(SimulationError::WeightCountMismatch {
            expected: assets,
            actual: weights.len(),
        });
    }
    if let Some(bad) = weights
        .weights()
        .iter()
        .find(|w| w.is_sign_negative() || **w > Decimal::ONE)
    {
        return Err(SimulationError::InvalidWeights {
            reason: format!("weight {bad} outside [0, 1]"),
        });
    }
    if !weights.sums_to_one() {
        return Err(SimulationError::InvalidWeights {
            reason: format!("weights total {}, expected 1.0", weights.total()),
        });
    }
    Ok(())
}
