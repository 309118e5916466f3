//! Report output port trait.

use crate::domain::backtest::BacktestOutcome;
use crate::domain::error::FimateError;
use crate::domain::optimizer::OptimizationResult;
use crate::domain::prepared::PreparedSeries;

/// Port for handing run results to a presentation layer.
pub trait ReportPort {
    /// Simulation columns and the rounded score of one run.
    fn write_backtest(&self, ticker: &str, outcome: &BacktestOutcome) -> Result<(), FimateError>;

    /// Close and SMA columns over the full series, warmup rows included.
    fn write_indicators(&self, ticker: &str, prepared: &PreparedSeries) -> Result<(), FimateError>;

    /// Every grid candidate with its score.
    fn write_optimization(
        &self,
        ticker: &str,
        result: &OptimizationResult,
    ) -> Result<(), FimateError>;
}
