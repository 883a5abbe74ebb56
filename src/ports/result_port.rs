//! Write-back port for per-day simulation rows.

use crate::domain::error::SimulationError;
use crate::domain::writeback::DailyResult;

/// Port for persisting the rows of a single evaluation.
pub trait ResultPort {
    fn write_day(&self, row: &DailyResult) -> Result<(), SimulationError>;

    /// Default implementation: writes row by row.
    fn write_run(&self, rows: &[DailyResult]) -> Result<(), SimulationError> {
        for row in rows {
            self.write_day(row)?;
        }
        Ok(())
    }
}
