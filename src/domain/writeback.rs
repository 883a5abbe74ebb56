//! Per-day rows persisted after a single evaluation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One asset's weighted value for a day, already formatted as dollars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetValue {
    pub symbol: String,
    pub dollars: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub asset_values: Vec<AssetValue>,
    pub benchmark_symbol: String,
    pub benchmark_dollars: String,
    pub portfolio_return: Decimal,
    pub portfolio_dollars: String,
    pub benchmark_delta: Decimal,
}
