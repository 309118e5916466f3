//! Indicator columns derived from a close series.
//!
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: one value per bar, `None` while the indicator is warming up
//! - `IndicatorCache`: memoized SMA columns over a single close buffer

pub mod log_return;
pub mod sma;

use crate::domain::error::FimateError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    LogReturn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Index of the first defined value, `None` if the column is all undefined.
    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::LogReturn => write!(f, "LOG_RETURN"),
        }
    }
}

/// SMA columns keyed by window, computed at most once per window.
///
/// Shared columns are handed out as `Arc`s so candidates evaluated on
/// different threads read the same buffers without copying them.
#[derive(Debug, Clone)]
pub struct IndicatorCache {
    closes: Arc<[f64]>,
    log_returns: Arc<IndicatorSeries>,
    sma: HashMap<usize, Arc<IndicatorSeries>>,
}

impl IndicatorCache {
    pub fn new(closes: Arc<[f64]>) -> Self {
        let log_returns = Arc::new(log_return::calculate_log_returns(&closes));
        Self {
            closes,
            log_returns,
            sma: HashMap::new(),
        }
    }

    pub fn closes(&self) -> &Arc<[f64]> {
        &self.closes
    }

    pub fn log_returns(&self) -> Arc<IndicatorSeries> {
        Arc::clone(&self.log_returns)
    }

    pub fn sma(&mut self, period: usize) -> Result<Arc<IndicatorSeries>, FimateError> {
        if let Some(series) = self.sma.get(&period) {
            return Ok(Arc::clone(series));
        }
        let series = Arc::new(sma::calculate_sma(&self.closes, period)?);
        self.sma.insert(period, Arc::clone(&series));
        Ok(series)
    }

    /// Computes every listed window up front.
    pub fn warm(&mut self, periods: &[usize]) -> Result<(), FimateError> {
        for &period in periods {
            self.sma(period)?;
        }
        Ok(())
    }

    /// Already-computed column, without computing it.
    pub fn cached_sma(&self, period: usize) -> Option<Arc<IndicatorSeries>> {
        self.sma.get(&period).cloned()
    }

    pub fn cached_windows(&self) -> usize {
        self.sma.len()
    }
}
