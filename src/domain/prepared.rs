//! Price series with aligned log-return and SMA columns.
//!
//! Columns are immutable shared buffers. `set_parameters` swaps in a freshly
//! computed SMA column for whichever window changed; the log-return column is
//! computed once and never touched again, and clones taken earlier keep
//! their own columns.

use crate::domain::error::FimateError;
use crate::domain::indicator::log_return::calculate_log_returns;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorCache, IndicatorSeries};
use crate::domain::price_series::PriceSeries;
use crate::domain::strategy::{SmaParams, validate_window};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    dates: Arc<[NaiveDate]>,
    closes: Arc<[f64]>,
    log_return: Arc<IndicatorSeries>,
    sma_fast: Arc<IndicatorSeries>,
    sma_slow: Arc<IndicatorSeries>,
    params: SmaParams,
}

impl PreparedSeries {
    pub fn prepare(series: &PriceSeries, params: SmaParams) -> Result<Self, FimateError> {
        let closes = series.shared_closes();
        let log_return = Arc::new(calculate_log_returns(&closes));
        let sma_fast = Arc::new(calculate_sma(&closes, params.fast)?);
        let sma_slow = if params.slow == params.fast {
            Arc::clone(&sma_fast)
        } else {
            Arc::new(calculate_sma(&closes, params.slow)?)
        };

        Ok(Self {
            dates: series.shared_dates(),
            closes,
            log_return,
            sma_fast,
            sma_slow,
            params,
        })
    }

    /// Assembles a series from memoized columns without recomputing any of
    /// them. `cache` must have been built over the same closes as `series`.
    pub fn from_cache(
        series: &PriceSeries,
        cache: &mut IndicatorCache,
        params: SmaParams,
    ) -> Result<Self, FimateError> {
        Ok(Self {
            dates: series.shared_dates(),
            closes: Arc::clone(cache.closes()),
            log_return: cache.log_returns(),
            sma_fast: cache.sma(params.fast)?,
            sma_slow: cache.sma(params.slow)?,
            params,
        })
    }

    pub(crate) fn from_columns(
        series: &PriceSeries,
        log_return: Arc<IndicatorSeries>,
        sma_fast: Arc<IndicatorSeries>,
        sma_slow: Arc<IndicatorSeries>,
        params: SmaParams,
    ) -> Self {
        Self {
            dates: series.shared_dates(),
            closes: series.shared_closes(),
            log_return,
            sma_fast,
            sma_slow,
            params,
        }
    }

    /// Re-derives the SMA column of each window that changed. `None` keeps
    /// the current window. Both windows are validated before anything is
    /// replaced.
    pub fn set_parameters(
        &mut self,
        fast: Option<usize>,
        slow: Option<usize>,
    ) -> Result<(), FimateError> {
        if let Some(w) = fast {
            validate_window("sma_fast", w)?;
        }
        if let Some(w) = slow {
            validate_window("sma_slow", w)?;
        }

        if let Some(w) = fast.filter(|&w| w != self.params.fast) {
            self.sma_fast = if w == self.params.slow {
                Arc::clone(&self.sma_slow)
            } else {
                Arc::new(calculate_sma(&self.closes, w)?)
            };
            self.params.fast = w;
        }

        if let Some(w) = slow.filter(|&w| w != self.params.slow) {
            self.sma_slow = if w == self.params.fast {
                Arc::clone(&self.sma_fast)
            } else {
                Arc::new(calculate_sma(&self.closes, w)?)
            };
            self.params.slow = w;
        }

        Ok(())
    }

    pub fn params(&self) -> SmaParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn log_return(&self) -> &IndicatorSeries {
        &self.log_return
    }

    pub fn sma_fast(&self) -> &IndicatorSeries {
        &self.sma_fast
    }

    pub fn sma_slow(&self) -> &IndicatorSeries {
        &self.sma_slow
    }

    /// Number of leading rows with at least one undefined column.
    pub fn warmup(&self) -> usize {
        (0..self.len())
            .position(|i| {
                self.log_return.get(i).is_some()
                    && self.sma_fast.get(i).is_some()
                    && self.sma_slow.get(i).is_some()
            })
            .unwrap_or(self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_series::PricePoint;
    use approx::assert_abs_diff_eq;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
                .collect(),
        )
        .unwrap()
    }

    fn params(fast: usize, slow: usize) -> SmaParams {
        SmaParams::new(fast, slow).unwrap()
    }

    #[test]
    fn prepare_aligns_columns() {
        let prepared = PreparedSeries::prepare(&series(&[10.0, 11.0, 12.0, 11.0]), params(2, 3)).unwrap();

        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared.log_return().len(), 4);
        assert_eq!(prepared.sma_fast().len(), 4);
        assert_eq!(prepared.sma_slow().len(), 4);
        assert_abs_diff_eq!(prepared.sma_fast().get(1).unwrap(), 10.5, epsilon = 1e-12);
        assert_abs_diff_eq!(prepared.sma_slow().get(2).unwrap(), 11.0, epsilon = 1e-12);
        assert_eq!(prepared.warmup(), 2);
    }

    #[test]
    fn warmup_covers_log_return_for_window_one() {
        let prepared = PreparedSeries::prepare(&series(&[10.0, 11.0, 12.0]), params(1, 1)).unwrap();
        assert_eq!(prepared.warmup(), 1);
    }

    #[test]
    fn warmup_when_window_exceeds_length() {
        let prepared = PreparedSeries::prepare(&series(&[10.0, 11.0]), params(2, 5)).unwrap();
        assert_eq!(prepared.warmup(), 2);
    }

    #[test]
    fn set_parameters_replaces_only_changed_column() {
        let mut prepared =
            PreparedSeries::prepare(&series(&[10.0, 11.0, 12.0, 11.0, 10.0]), params(2, 3)).unwrap();
        let log_return_before = Arc::clone(&prepared.log_return);
        let fast_before = Arc::clone(&prepared.sma_fast);

        prepared.set_parameters(None, Some(4)).unwrap();

        assert!(Arc::ptr_eq(&log_return_before, &prepared.log_return));
        assert!(Arc::ptr_eq(&fast_before, &prepared.sma_fast));
        assert_eq!(prepared.params(), params(2, 4));
        assert_eq!(prepared.sma_slow().first_valid_index(), Some(3));
    }

    #[test]
    fn set_parameters_matches_fresh_prepare() {
        let s = series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let mut prepared = PreparedSeries::prepare(&s, params(2, 3)).unwrap();
        prepared.set_parameters(Some(3), Some(5)).unwrap();

        assert_eq!(prepared, PreparedSeries::prepare(&s, params(3, 5)).unwrap());
    }

    #[test]
    fn set_parameters_is_idempotent() {
        let s = series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let mut prepared = PreparedSeries::prepare(&s, params(2, 3)).unwrap();
        prepared.set_parameters(Some(4), Some(2)).unwrap();
        let once = prepared.clone();
        prepared.set_parameters(Some(4), Some(2)).unwrap();

        assert_eq!(prepared, once);
    }

    #[test]
    fn set_parameters_does_not_touch_clones() {
        let s = series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let mut prepared = PreparedSeries::prepare(&s, params(2, 3)).unwrap();
        let snapshot = prepared.clone();

        prepared.set_parameters(Some(4), None).unwrap();

        assert_eq!(snapshot.params(), params(2, 3));
        assert_eq!(snapshot.sma_fast().first_valid_index(), Some(1));
    }

    #[test]
    fn set_parameters_rejects_zero_without_mutating() {
        let s = series(&[10.0, 11.0, 12.0]);
        let mut prepared = PreparedSeries::prepare(&s, params(2, 3)).unwrap();
        let before = prepared.clone();

        assert!(prepared.set_parameters(Some(1), Some(0)).is_err());
        assert_eq!(prepared, before);
    }

    #[test]
    fn from_cache_matches_prepare() {
        let s = series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let mut cache = IndicatorCache::new(s.shared_closes());
        let cached = PreparedSeries::from_cache(&s, &mut cache, params(2, 4)).unwrap();

        assert_eq!(cached, PreparedSeries::prepare(&s, params(2, 4)).unwrap());
        assert_eq!(cache.cached_windows(), 2);
    }
}
