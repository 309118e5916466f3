//! Performance scoring and report statistics.

use super::simulation::SimulationResult;
use std::fmt;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DISPLAY_DECIMALS: i32 = 2;

/// Gross strategy performance and its out-/underperformance against
/// buy-and-hold, both as growth factors (1.0 = flat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceScore {
    pub absolute: f64,
    pub relative: f64,
}

impl PerformanceScore {
    pub fn evaluate(result: &SimulationResult) -> Self {
        let absolute = result.final_strategy_return();
        Self {
            absolute,
            relative: absolute - result.final_market_return(),
        }
    }

    /// Both values rounded to two decimals, for display only.
    pub fn rounded(&self) -> Self {
        Self {
            absolute: round_to(self.absolute, DISPLAY_DECIMALS),
            relative: round_to(self.relative, DISPLAY_DECIMALS),
        }
    }
}

impl fmt::Display for PerformanceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rounded();
        write!(f, "({:.2}, {:.2})", r.absolute, r.relative)
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Descriptive statistics of a run. Not used when ranking candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub bars: usize,
    pub position_changes: usize,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl Metrics {
    pub fn compute(result: &SimulationResult) -> Self {
        let bars = result.len();
        let growth = result.final_strategy_return();

        let years = bars as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && growth.is_finite() && growth > 0.0 {
            growth.powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let returns: Vec<f64> = result.strategy_returns().collect();
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(
            result
                .rows()
                .iter()
                .map(|r| r.cumulative_strategy_return),
        );

        Metrics {
            bars,
            position_changes: result.position_changes(),
            annualized_return,
            sharpe_ratio: compute_sharpe(&returns),
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak, and the longest
/// run of bars spent below a previous peak. The curve starts at 1.0.
fn compute_drawdown(curve: impl IntoIterator<Item = f64>) -> (f64, usize) {
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for value in curve {
        if value >= peak {
            peak = value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

/// Annualized Sharpe ratio of per-bar log returns with a zero risk-free rate.
fn compute_sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
