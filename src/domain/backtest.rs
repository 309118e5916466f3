//! Backtest session: one price series, its prepared columns and the current
//! window pair.
//!
//! BacktestConfig defines which series and windows a run uses.

use crate::domain::error::FimateError;
use crate::domain::metrics::{Metrics, PerformanceScore};
use crate::domain::optimizer::{self, Objective, OptimizationResult, ParameterGrid};
use crate::domain::prepared::PreparedSeries;
use crate::domain::price_series::PriceSeries;
use crate::domain::simulation::{SimulationResult, run_strategy};
use crate::domain::strategy::SmaParams;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub params: SmaParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub simulation: SimulationResult,
    pub score: PerformanceScore,
    pub metrics: Metrics,
}

impl BacktestOutcome {
    pub fn from_simulation(simulation: SimulationResult) -> Self {
        let score = PerformanceScore::evaluate(&simulation);
        let metrics = Metrics::compute(&simulation);
        Self {
            simulation,
            score,
            metrics,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmaBacktester {
    series: PriceSeries,
    prepared: PreparedSeries,
}

impl SmaBacktester {
    pub fn new(series: PriceSeries, params: SmaParams) -> Result<Self, FimateError> {
        let prepared = PreparedSeries::prepare(&series, params)?;
        Ok(Self { series, prepared })
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn prepared(&self) -> &PreparedSeries {
        &self.prepared
    }

    pub fn params(&self) -> SmaParams {
        self.prepared.params()
    }

    /// Changes either window; `None` keeps the current one.
    pub fn set_parameters(
        &mut self,
        fast: Option<usize>,
        slow: Option<usize>,
    ) -> Result<(), FimateError> {
        self.prepared.set_parameters(fast, slow)
    }

    pub fn run_strategy(&self) -> Result<BacktestOutcome, FimateError> {
        let simulation = run_strategy(&self.prepared)?;
        Ok(BacktestOutcome::from_simulation(simulation))
    }

    /// Searches `grid` and leaves the session on the winning windows.
    pub fn optimize_parameters(
        &mut self,
        grid: &ParameterGrid,
        objective: Objective,
        parallel: bool,
    ) -> Result<OptimizationResult, FimateError> {
        let result = if parallel {
            search_parallel(&self.series, grid, objective)?
        } else {
            optimizer::optimize_by(&self.series, grid, |r| objective.score(r))?
        };
        self.set_parameters(Some(result.best.fast), Some(result.best.slow))?;
        Ok(result)
    }
}

#[cfg(feature = "parallel")]
fn search_parallel(
    series: &PriceSeries,
    grid: &ParameterGrid,
    objective: Objective,
) -> Result<OptimizationResult, FimateError> {
    optimizer::optimize_parallel(series, grid, objective)
}

#[cfg(not(feature = "parallel"))]
fn search_parallel(
    _series: &PriceSeries,
    _grid: &ParameterGrid,
    _objective: Objective,
) -> Result<OptimizationResult, FimateError> {
    Err(FimateError::invalid_parameter(
        "parallel",
        "the parallel feature is required for parallel search",
    ))
}
