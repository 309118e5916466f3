//! Daily close price series.

use crate::domain::error::FimateError;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered `(date, close)` observations with strictly increasing dates.
///
/// Dates and closes are held in shared buffers so prepared series and
/// simulation results can reference them without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Arc<[NaiveDate]>,
    closes: Arc<[f64]>,
}

impl PriceSeries {
    /// Builds a series, rejecting unordered or duplicate dates and closes
    /// that are not finite and positive.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, FimateError> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(FimateError::InvalidData {
                    reason: format!("close on {} must be positive, got {}", point.date, point.close),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(FimateError::InvalidData {
                    reason: format!(
                        "dates must be strictly increasing ({} follows {})",
                        point.date,
                        points[i - 1].date
                    ),
                });
            }
        }

        Ok(Self {
            dates: points.iter().map(|p| p.date).collect(),
            closes: points.iter().map(|p| p.close).collect(),
        })
    }

    pub fn empty() -> Self {
        Self {
            dates: Arc::from(Vec::new()),
            closes: Arc::from(Vec::new()),
        }
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

    pub(crate) fn shared_dates(&self) -> Arc<[NaiveDate]> {
        Arc::clone(&self.dates)
    }

    pub(crate) fn shared_closes(&self) -> Arc<[f64]> {
        Arc::clone(&self.closes)
    }

    pub fn get(&self, index: usize) -> Option<PricePoint> {
        Some(PricePoint::new(*self.dates.get(index)?, *self.closes.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.dates
            .iter()
            .zip(self.closes.iter())
            .map(|(&date, &close)| PricePoint::new(date, close))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn builds_ordered_series() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), 11.0),
            PricePoint::new(day(4), 12.0),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), &[10.0, 11.0, 12.0]);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(4)));
        assert_eq!(series.get(2), Some(PricePoint::new(day(4), 12.0)));
        assert_eq!(series.get(3), None);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(1), 11.0),
        ])
        .unwrap_err();
        assert!(matches!(err, FimateError::InvalidData { .. }));
    }

    #[test]
    fn rejects_decreasing_dates() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(3), 10.0),
            PricePoint::new(day(2), 11.0),
        ])
        .unwrap_err();
        assert!(matches!(err, FimateError::InvalidData { .. }));
    }

    #[test]
    fn rejects_non_positive_close() {
        assert!(PriceSeries::new(vec![PricePoint::new(day(1), 0.0)]).is_err());
        assert!(PriceSeries::new(vec![PricePoint::new(day(1), -1.0)]).is_err());
        assert!(PriceSeries::new(vec![PricePoint::new(day(1), f64::NAN)]).is_err());
    }

    #[test]
    fn empty_series_is_legal() {
        let series = PriceSeries::new(vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series, PriceSeries::empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn iter_yields_points_in_order() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), 11.0),
        ])
        .unwrap();
        let points: Vec<PricePoint> = series.iter().collect();
        assert_eq!(points[0].date, day(1));
        assert!((points[1].close - 11.0).abs() < f64::EPSILON);
    }
}
