//! Exhaustive grid search over SMA window pairs.
//!
//! Candidates are enumerated with the fast window in the outer loop and the
//! slow window in the inner loop. Every candidate is scored; the highest
//! score wins and ties go to the earliest candidate. A candidate without
//! enough history is excluded instead of failing the search.

use crate::domain::error::FimateError;
use crate::domain::metrics::PerformanceScore;
use crate::domain::prepared::PreparedSeries;
use crate::domain::price_series::PriceSeries;
use crate::domain::simulation::{SimulationResult, run_strategy};
use crate::domain::strategy::SmaParams;
use std::fmt;
use std::str::FromStr;

/// Range values beyond this count are rejected before enumeration.
const MAX_RANGE_VALUES: usize = 1_000_000;
/// Window pairs beyond this count are rejected before enumeration.
const MAX_GRID_CANDIDATES: usize = 1_000_000;
const RANGE_TOLERANCE: f64 = 1e-9;

/// `low..=high` stepped by `step`. Bounds and step may be fractional; every
/// value is rounded half away from zero to a whole window before use, so
/// `(1.6, 3, 0.7)` yields windows 2 and 3 rather than truncating 1.6 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(low: f64, high: f64, step: f64) -> Self {
        Self { low, high, step }
    }

    /// Range holding exactly one window.
    pub fn single(window: usize) -> Self {
        Self::new(window as f64, window as f64, 1.0)
    }

    pub fn validate(&self, name: &str) -> Result<(), FimateError> {
        self.value_count(name).map(|_| ())
    }

    /// Number of stepped values, bounds checked before any cast.
    fn value_count(&self, name: &str) -> Result<usize, FimateError> {
        if !self.low.is_finite() || !self.high.is_finite() || !self.step.is_finite() {
            return Err(FimateError::invalid_parameter(
                name,
                "range bounds and step must be finite",
            ));
        }
        if self.step <= 0.0 {
            return Err(FimateError::invalid_parameter(name, "step must be positive"));
        }
        if self.low > self.high {
            return Err(FimateError::invalid_parameter(
                name,
                format!("low ({}) is greater than high ({})", self.low, self.high),
            ));
        }
        if self.low.round() < 1.0 {
            return Err(FimateError::invalid_parameter(
                name,
                "windows must round to at least 1",
            ));
        }
        let too_many = || {
            FimateError::invalid_parameter(
                name,
                format!("range yields more than {} values", MAX_RANGE_VALUES),
            )
        };
        let steps = ((self.high - self.low) / self.step + RANGE_TOLERANCE).floor();
        if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
            return Err(too_many());
        }
        (steps as usize)
            .checked_add(1)
            .filter(|&count| count <= MAX_RANGE_VALUES)
            .ok_or_else(too_many)
    }

    /// Rounded windows in ascending order, repeated roundings collapsed.
    pub fn windows(&self, name: &str) -> Result<Vec<usize>, FimateError> {
        let count = self.value_count(name)?;
        let mut windows: Vec<usize> = (0..count)
            .map(|k| (self.low + k as f64 * self.step).round() as usize)
            .collect();
        windows.dedup();
        Ok(windows)
    }
}

impl FromStr for ParamRange {
    type Err = String;

    /// Parses `low,high,step`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected low,high,step but got '{}'", s));
        }
        let mut values = [0.0f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("'{}' is not a number", part))?;
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

impl fmt::Display for ParamRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.low, self.high, self.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterGrid {
    pub fast: ParamRange,
    pub slow: ParamRange,
}

impl ParameterGrid {
    pub fn new(fast: ParamRange, slow: ParamRange) -> Self {
        Self { fast, slow }
    }

    /// Checks both ranges and caps the number of window pairs.
    pub fn validate(&self) -> Result<(), FimateError> {
        let fast = self.fast.value_count("sma_fast_range")?;
        let slow = self.slow.value_count("sma_slow_range")?;
        fast.checked_mul(slow)
            .filter(|&pairs| pairs <= MAX_GRID_CANDIDATES)
            .map(|_| ())
            .ok_or_else(|| {
                FimateError::invalid_parameter(
                    "parameter_grid",
                    format!(
                        "{} x {} window pairs exceeds {}",
                        fast, slow, MAX_GRID_CANDIDATES
                    ),
                )
            })
    }

    /// First pair in enumeration order, without building the full grid.
    pub fn first_candidate(&self) -> Result<SmaParams, FimateError> {
        self.validate()?;
        let fast = self.fast.windows("sma_fast_range")?;
        let slow = self.slow.windows("sma_slow_range")?;
        match (fast.first(), slow.first()) {
            (Some(&f), Some(&s)) => SmaParams::new(f, s),
            _ => Err(FimateError::invalid_parameter("parameter_grid", "grid is empty")),
        }
    }

    /// Every window pair in enumeration order.
    pub fn candidates(&self) -> Result<Vec<SmaParams>, FimateError> {
        self.validate()?;
        let fast = self.fast.windows("sma_fast_range")?;
        let slow = self.slow.windows("sma_slow_range")?;

        let mut candidates = Vec::with_capacity(fast.len() * slow.len());
        for &f in &fast {
            for &s in &slow {
                candidates.push(SmaParams::new(f, s)?);
            }
        }
        Ok(candidates)
    }
}

/// Built-in objectives. Callers needing anything else pass their own scoring
/// function to [`optimize_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    /// Final strategy growth factor.
    #[default]
    Absolute,
    /// Strategy growth minus buy-and-hold growth.
    Relative,
}

impl Objective {
    pub fn score(self, result: &SimulationResult) -> f64 {
        let score = PerformanceScore::evaluate(result);
        match self {
            Objective::Absolute => score.absolute,
            Objective::Relative => score.relative,
        }
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" => Ok(Objective::Absolute),
            "relative" => Ok(Objective::Relative),
            other => Err(format!(
                "unknown objective '{}' (expected absolute or relative)",
                other
            )),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Absolute => write!(f, "absolute"),
            Objective::Relative => write!(f, "relative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeConfig {
    pub grid: ParameterGrid,
    pub objective: Objective,
    pub parallel: bool,
}

/// One evaluated grid point; `score` is `None` when the candidate lacked
/// enough history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub params: SmaParams,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub best: SmaParams,
    /// Unrounded objective value of `best`.
    pub performance: f64,
    pub candidates: Vec<CandidateScore>,
}

impl OptimizationResult {
    pub fn evaluated(&self) -> usize {
        self.candidates.iter().filter(|c| c.score.is_some()).count()
    }

    pub fn skipped(&self) -> usize {
        self.candidates.len() - self.evaluated()
    }
}

/// Grid search maximizing absolute performance.
pub fn optimize(
    series: &PriceSeries,
    grid: &ParameterGrid,
) -> Result<OptimizationResult, FimateError> {
    optimize_by(series, grid, |result| Objective::Absolute.score(result))
}

/// Grid search maximizing a caller-supplied score.
///
/// A single prepared series is re-parameterized in place, so each candidate
/// is fully scored before the next one mutates the SMA columns.
pub fn optimize_by<F>(
    series: &PriceSeries,
    grid: &ParameterGrid,
    score: F,
) -> Result<OptimizationResult, FimateError>
where
    F: Fn(&SimulationResult) -> f64,
{
    let candidates = grid.candidates()?;
    tracing::info!(
        candidates = candidates.len(),
        bars = series.len(),
        "starting grid search"
    );

    let mut prepared: Option<PreparedSeries> = None;
    let mut scored = Vec::with_capacity(candidates.len());

    for params in candidates {
        let current = match prepared.take() {
            Some(mut p) => {
                p.set_parameters(Some(params.fast), Some(params.slow))?;
                p
            }
            None => PreparedSeries::prepare(series, params)?,
        };
        scored.push(CandidateScore {
            params,
            score: score_candidate(&current, &score)?,
        });
        prepared = Some(current);
    }

    select_best(series, scored)
}

/// Grid search maximizing `objective`, evaluated on the rayon thread pool.
///
/// SMA columns are computed once per distinct window and each candidate gets
/// its own prepared series built from them, so no worker mutates a shared
/// buffer. The winner is picked in enumeration order afterwards, giving the
/// same answer as the sequential search.
#[cfg(feature = "parallel")]
pub fn optimize_parallel(
    series: &PriceSeries,
    grid: &ParameterGrid,
    objective: Objective,
) -> Result<OptimizationResult, FimateError> {
    optimize_parallel_by(series, grid, move |result| objective.score(result))
}

#[cfg(feature = "parallel")]
pub fn optimize_parallel_by<F>(
    series: &PriceSeries,
    grid: &ParameterGrid,
    score: F,
) -> Result<OptimizationResult, FimateError>
where
    F: Fn(&SimulationResult) -> f64 + Sync,
{
    use crate::domain::indicator::IndicatorCache;
    use rayon::prelude::*;

    let candidates = grid.candidates()?;
    tracing::info!(
        candidates = candidates.len(),
        bars = series.len(),
        threads = rayon::current_num_threads(),
        "starting parallel grid search"
    );

    let mut cache = IndicatorCache::new(series.shared_closes());
    let mut windows: Vec<usize> = candidates
        .iter()
        .flat_map(|p| [p.fast, p.slow])
        .collect();
    windows.sort_unstable();
    windows.dedup();
    cache.warm(&windows)?;

    let log_returns = cache.log_returns();
    let scored = candidates
        .par_iter()
        .map(|&params| -> Result<CandidateScore, FimateError> {
            let column = |window: usize| {
                cache.cached_sma(window).ok_or_else(|| {
                    FimateError::invalid_parameter(
                        "sma window",
                        format!("{} was not precomputed", window),
                    )
                })
            };
            let prepared = PreparedSeries::from_columns(
                series,
                log_returns.clone(),
                column(params.fast)?,
                column(params.slow)?,
                params,
            );
            Ok(CandidateScore {
                params,
                score: score_candidate(&prepared, &score)?,
            })
        })
        .collect::<Result<Vec<_>, FimateError>>()?;

    select_best(series, scored)
}

fn score_candidate<F>(prepared: &PreparedSeries, score: &F) -> Result<Option<f64>, FimateError>
where
    F: Fn(&SimulationResult) -> f64,
{
    let params = prepared.params();
    match run_strategy(prepared) {
        Ok(result) => {
            let value = score(&result);
            tracing::debug!(fast = params.fast, slow = params.slow, score = value, "candidate scored");
            Ok(Some(value))
        }
        Err(e) if e.is_insufficient_data() => {
            tracing::debug!(fast = params.fast, slow = params.slow, "candidate skipped: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn select_best(
    series: &PriceSeries,
    candidates: Vec<CandidateScore>,
) -> Result<OptimizationResult, FimateError> {
    let mut best: Option<(SmaParams, f64)> = None;
    for candidate in &candidates {
        let Some(score) = candidate.score else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ if score.is_nan() => {}
            _ => best = Some((candidate.params, score)),
        }
    }

    let Some((best, performance)) = best else {
        let minimum = candidates
            .iter()
            .map(|c| c.params.min_bars())
            .min()
            .unwrap_or(0);
        return Err(FimateError::InsufficientData {
            rows: series.len(),
            minimum,
        });
    };

    let result = OptimizationResult {
        best,
        performance,
        candidates,
    };
    tracing::info!(
        best = %result.best,
        performance = result.performance,
        evaluated = result.evaluated(),
        skipped = result.skipped(),
        "grid search finished"
    );
    Ok(result)
}
