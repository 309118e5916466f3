//! Crossover strategy simulation.
//!
//! Rows with an undefined log return or SMA are dropped first. Each remaining
//! row gets a side from its own SMAs, but earns the return of the side held
//! on the previous row, so the first remaining row only seeds a side and is
//! dropped as well. Cumulative returns compound log returns geometrically:
//! C[t] = exp(sum(R[0..=t])).

use crate::domain::error::FimateError;
use crate::domain::position::Side;
use crate::domain::prepared::PreparedSeries;
use crate::domain::strategy::SmaParams;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRow {
    pub date: NaiveDate,
    pub close: f64,
    pub log_return: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub position: Side,
    pub strategy_return: f64,
    pub cumulative_market_return: f64,
    pub cumulative_strategy_return: f64,
}

/// Output of one simulation run. Always holds at least one row.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    params: SmaParams,
    rows: Vec<SimulationRow>,
}

impl SimulationResult {
    pub fn params(&self) -> SmaParams {
        self.params
    }

    pub fn rows(&self) -> &[SimulationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Final buy-and-hold growth factor.
    pub fn final_market_return(&self) -> f64 {
        self.rows
            .last()
            .map(|r| r.cumulative_market_return)
            .unwrap_or(1.0)
    }

    /// Final strategy growth factor.
    pub fn final_strategy_return(&self) -> f64 {
        self.rows
            .last()
            .map(|r| r.cumulative_strategy_return)
            .unwrap_or(1.0)
    }

    pub fn strategy_returns(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.strategy_return)
    }

    /// Bars on which the held side differs from the previous bar.
    pub fn position_changes(&self) -> usize {
        self.rows
            .windows(2)
            .filter(|w| w[0].position != w[1].position)
            .count()
    }
}

/// Rows that survive the first trim: every column defined.
struct UsableRow {
    index: usize,
    log_return: f64,
    sma_fast: f64,
    sma_slow: f64,
}

pub fn run_strategy(prepared: &PreparedSeries) -> Result<SimulationResult, FimateError> {
    let usable: Vec<UsableRow> = (0..prepared.len())
        .filter_map(|index| {
            Some(UsableRow {
                index,
                log_return: prepared.log_return().get(index)?,
                sma_fast: prepared.sma_fast().get(index)?,
                sma_slow: prepared.sma_slow().get(index)?,
            })
        })
        .collect();

    if usable.len() < 2 {
        return Err(FimateError::InsufficientData {
            rows: prepared.len(),
            minimum: prepared.params().min_bars(),
        });
    }

    let dates = prepared.dates();
    let closes = prepared.closes();
    let mut rows = Vec::with_capacity(usable.len() - 1);
    let mut held = Side::from_crossover(usable[0].sma_fast, usable[0].sma_slow);
    let mut market_sum = 0.0;
    let mut strategy_sum = 0.0;

    for row in &usable[1..] {
        let strategy_return = held.sign() * row.log_return;
        market_sum += row.log_return;
        strategy_sum += strategy_return;

        let position = Side::from_crossover(row.sma_fast, row.sma_slow);
        rows.push(SimulationRow {
            date: dates[row.index],
            close: closes[row.index],
            log_return: row.log_return,
            sma_fast: row.sma_fast,
            sma_slow: row.sma_slow,
            position,
            strategy_return,
            cumulative_market_return: market_sum.exp(),
            cumulative_strategy_return: strategy_sum.exp(),
        });
        held = position;
    }

    Ok(SimulationResult {
        params: prepared.params(),
        rows,
    })
}
