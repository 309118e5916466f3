#![allow(dead_code)]

use chrono::NaiveDate;
use fimate::domain::error::FimateError;
use fimate::domain::price_series::{PricePoint, PriceSeries};
use fimate::ports::data_port::PriceDataPort;
use std::collections::HashMap;

/// Closes of the ten-bar fixture used across the suite.
pub const FIXTURE_CLOSES: [f64; 10] = [10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0];

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, ticker: &str, start_date: &str, closes: &[f64]) -> Self {
        self.data
            .insert(ticker.to_string(), make_points(start_date, closes));
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FimateError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(FimateError::DataSource {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date < end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(points)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day starting at `start_date`.
pub fn make_points(start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_points("2024-01-01", closes)).unwrap()
}

pub fn fixture_series() -> PriceSeries {
    make_series(&FIXTURE_CLOSES)
}

/// Strictly increasing closes.
pub fn rising_closes(count: usize, start_price: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + i as f64).collect()
}

/// Deterministic oscillating closes, positive for any `count`.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 10.0 * (t / 7.0).sin() + 4.0 * (t / 3.0).cos() + 0.05 * t
        })
        .collect()
}

/// CSV price file content with `date,close` rows starting at `start_date`.
pub fn price_csv(start_date: &str, closes: &[f64]) -> String {
    let mut content = String::from("Date,Close\n");
    for p in make_points(start_date, closes) {
        content.push_str(&format!("{},{}\n", p.date.format("%Y-%m-%d"), p.close));
    }
    content
}
