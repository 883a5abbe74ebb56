//! Return-history access port trait.

use crate::domain::error::SimulationError;
use crate::domain::record::{BenchmarkRecord, ReturnRecord};

pub trait ReturnsPort {
    /// Records ascending by date, returns positional in `symbols` order.
    fn fetch_asset_returns(&self, symbols: &[String])
    -> Result<Vec<ReturnRecord>, SimulationError>;

    fn fetch_benchmark_returns(
        &self,
        benchmark: &str,
    ) -> Result<Vec<BenchmarkRecord>, SimulationError>;
}
