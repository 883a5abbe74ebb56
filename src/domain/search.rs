//! Brute-force Sharpe-ratio search over a coarse allocation grid.
//!
//! Grid points are integer tenths that always total [`GRID_STEPS`], so every candidate
//! sums to exactly 1.0. Candidates are visited in lexicographic order (last asset
//! fastest) and the first strictly-greatest Sharpe ratio wins.

use crate::domain::allocation::{AllocationVector, GRID_STEPS};
use crate::domain::error::SimulationError;
use crate::domain::record::History;
use crate::domain::returns::daily_series;
use crate::domain::statistics::RiskSummary;
use itertools::structs::Combinations;
use itertools::Itertools;
use std::ops::Range;

/// Every feasible grid vector for `dims` assets, as integer tenths.
///
/// Each vector is a composition of [`GRID_STEPS`] into `dims` parts, read off the
/// positions of `dims - 1` bars among `GRID_STEPS + dims - 1` slots. Bar positions
/// ascend lexicographically, and so do the compositions they encode.
pub struct AllocationGrid {
    bars: Option<Combinations<Range<u32>>>,
}

impl AllocationGrid {
    pub fn new(dims: usize) -> Self {
        let bars = (dims > 0).then(|| {
            let slots = GRID_STEPS + dims as u32 - 1;
            (0..slots).combinations(dims - 1)
        });
        Self { bars }
    }
}

impl Iterator for AllocationGrid {
    type Item = Vec<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let bars = self.bars.as_mut()?.next()?;
        let mut units = Vec::with_capacity(bars.len() + 1);
        let mut start = 0;
        for bar in bars {
            units.push(bar - start);
            start = bar + 1;
        }
        let slots = GRID_STEPS + units.len() as u32;
        units.push(slots - start);
        Some(units)
    }
}

/// Size of [`AllocationGrid`] for `dims` assets: C(GRID_STEPS + dims - 1, dims - 1).
pub fn feasible_count(dims: usize) -> u128 {
    if dims == 0 {
        return 0;
    }
    let steps = GRID_STEPS as u128;
    (1..=steps).fold(1u128, |acc, k| acc.saturating_mul(dims as u128 - 1 + k) / k)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Enumerating,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub allocation: AllocationVector,
    pub risk: RiskSummary,
    pub evaluated: usize,
}

pub struct AllocationSearch<'h> {
    history: &'h History,
    grid: AllocationGrid,
    state: SearchState,
    best: Option<(AllocationVector, RiskSummary)>,
    evaluated: usize,
}

impl<'h> AllocationSearch<'h> {
    pub fn new(history: &'h History) -> Self {
        Self {
            history,
            grid: AllocationGrid::new(history.asset_count()),
            state: SearchState::Enumerating,
            best: None,
            evaluated: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Evaluate the next feasible candidate, or move to `Done` when the grid is spent.
    pub fn step(&mut self) -> Result<SearchState, SimulationError> {
        if self.state == SearchState::Done {
            return Ok(SearchState::Done);
        }
        let Some(units) = self.grid.next() else {
            self.state = SearchState::Done;
            return Ok(SearchState::Done);
        };

        let candidate = AllocationVector::from_tenths(&units);
        let series = daily_series(self.history, &candidate)?;
        let risk = RiskSummary::compute(&series.deltas)?;
        self.evaluated += 1;
        tracing::trace!(allocation = %candidate, sharpe = %risk.sharpe_ratio, "evaluated candidate");

        let improves = match &self.best {
            Some((_, best)) => risk.sharpe_ratio > best.sharpe_ratio,
            None => true,
        };
        if improves {
            tracing::debug!(allocation = %candidate, sharpe = %risk.sharpe_ratio, "new best allocation");
            self.best = Some((candidate, risk));
        }
        Ok(SearchState::Enumerating)
    }

    pub fn run(mut self) -> Result<SearchOutcome, SimulationError> {
        while self.step()? == SearchState::Enumerating {}

        let (allocation, risk) = self.best.ok_or(SimulationError::NoFeasibleAllocation {
            assets: self.history.asset_count(),
        })?;
        tracing::info!(
            allocation = %allocation,
            sharpe = %risk.sharpe_ratio,
            candidates = self.evaluated,
            "allocation search complete"
        );
        Ok(SearchOutcome {
            allocation,
            risk,
            evaluated: self.evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{BenchmarkRecord, ReturnRecord};
    use crate::domain::universe::Universe;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn history(rows: &[(&[Decimal], Decimal)]) -> History {
        let symbols: Vec<String> = (0..rows[0].0.len()).map(|i| format!("S{i}")).collect();
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let mut records = Vec::new();
        let mut bench = Vec::new();
        for (i, (returns, b)) in rows.iter().enumerate() {
            let date = start + chrono::Duration::days(i as i64);
            records.push(ReturnRecord {
                date,
                cumulative_returns: returns.to_vec(),
            });
            bench.push(BenchmarkRecord {
                date,
                cumulative_return: *b,
            });
        }
        History::new(
            Universe {
                symbols,
                benchmark: "SPY".into(),
            },
            records,
            bench,
        )
        .unwrap()
    }

    #[test]
    fn four_asset_grid_has_286_candidates() {
        assert_eq!(feasible_count(4), 286);
    }

    #[test]
    fn grid_counts_for_other_dimensions() {
        assert_eq!(feasible_count(1), 1);
        assert_eq!(feasible_count(2), 11);
        assert_eq!(feasible_count(3), 66);
        assert_eq!(feasible_count(0), 0);
        for dims in 1..=4 {
            assert_eq!(feasible_count(dims), AllocationGrid::new(dims).count() as u128);
        }
    }

    #[test]
    fn grid_is_lexicographic() {
        let first: Vec<Vec<u32>> = AllocationGrid::new(2).take(3).collect();
        assert_eq!(first, vec![vec![0, 10], vec![1, 9], vec![2, 8]]);
        let last = AllocationGrid::new(4).last().unwrap();
        assert_eq!(last, vec![10, 0, 0, 0]);
    }

    #[test]
    fn grid_matches_filtered_cartesian_product() {
        for dims in 1..=4 {
            let filtered: Vec<Vec<u32>> = (0..dims)
                .map(|_| 0..=GRID_STEPS)
                .multi_cartesian_product()
                .filter(|units| units.iter().sum::<u32>() == GRID_STEPS)
                .collect();
            assert_eq!(AllocationGrid::new(dims).collect::<Vec<_>>(), filtered);
        }
    }

    #[test]
    fn eight_asset_grid_enumerates_only_feasible_points() {
        assert_eq!(AllocationGrid::new(8).count() as u128, feasible_count(8));
        assert_eq!(feasible_count(8), 19448);
    }

    #[test]
    fn every_candidate_sums_to_one() {
        assert!(
            AllocationGrid::new(4).all(|units| AllocationVector::from_tenths(&units).sums_to_one())
        );
    }

    #[test]
    fn search_matches_exhaustive_scan() {
        let h = history(&[
            (&[dec!(0.10), dec!(0.50)], dec!(0.01)),
            (&[dec!(0.20), dec!(0.10)], dec!(0.02)),
            (&[dec!(0.30), dec!(0.60)], dec!(0.03)),
            (&[dec!(0.45), dec!(0.20)], dec!(0.04)),
        ]);
        let outcome = AllocationSearch::new(&h).run().unwrap();
        assert_eq!(outcome.evaluated, 11);
        assert!(outcome.allocation.sums_to_one());

        let mut best: Option<(AllocationVector, Decimal)> = None;
        for a in 0..=10u32 {
            let candidate = AllocationVector::from_tenths(&[a, 10 - a]);
            let series = daily_series(&h, &candidate).unwrap();
            let sharpe = RiskSummary::compute(&series.deltas).unwrap().sharpe_ratio;
            if best.as_ref().is_none_or(|(_, s)| sharpe > *s) {
                best = Some((candidate, sharpe));
            }
        }
        let (allocation, sharpe) = best.unwrap();
        assert_eq!(outcome.allocation, allocation);
        assert_eq!(outcome.risk.sharpe_ratio, sharpe);
    }

    #[test]
    fn ties_keep_first_candidate() {
        // identical assets give every candidate the same statistics
        let h = history(&[
            (&[dec!(0.10), dec!(0.10)], dec!(0.01)),
            (&[dec!(0.30), dec!(0.30)], dec!(0.02)),
            (&[dec!(0.35), dec!(0.35)], dec!(0.03)),
        ]);
        let outcome = AllocationSearch::new(&h).run().unwrap();
        assert_eq!(outcome.allocation, AllocationVector::from_tenths(&[0, 10]));
    }

    #[test]
    fn state_moves_to_done() {
        let h = history(&[(&[dec!(0.1)], dec!(0.0)), (&[dec!(0.3)], dec!(0.1))]);
        let mut search = AllocationSearch::new(&h);
        assert_eq!(search.state(), SearchState::Enumerating);
        assert_eq!(search.step().unwrap(), SearchState::Enumerating);
        assert_eq!(search.step().unwrap(), SearchState::Done);
        assert_eq!(search.step().unwrap(), SearchState::Done);
        assert_eq!(search.evaluated(), 1);
    }

    #[test]
    fn zero_assets_have_no_feasible_allocation() {
        let empty: &[Decimal] = &[];
        let h = history(&[(empty, dec!(0.01)), (empty, dec!(0.02))]);
        assert_eq!(h.asset_count(), 0);

        let err = AllocationSearch::new(&h).run().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::NoFeasibleAllocation { assets: 0 }
        ));
    }

    #[test]
    fn degenerate_candidate_aborts_search() {
        // every candidate tracks the benchmark exactly
        let h = history(&[
            (&[dec!(0.10), dec!(0.10)], dec!(0.10)),
            (&[dec!(0.20), dec!(0.20)], dec!(0.20)),
        ]);
        let err = AllocationSearch::new(&h).run().unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Statistics(crate::domain::error::StatisticsError::ZeroStandardDeviation)
        ));
    }
}
