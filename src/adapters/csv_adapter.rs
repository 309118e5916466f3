//! CSV file price data adapter.

use crate::domain::error::FimateError;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads `<base_path>/<TICKER>.csv` files with `date` and `close` columns.
pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, FimateError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| FimateError::DataSource {
            reason: format!("missing {} column", name),
        })
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FimateError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(ticker, path = %path.display(), "no price file for ticker");
                return Ok(PriceSeries::empty());
            }
            Err(e) => {
                return Err(FimateError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| FimateError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let date_col = column_index(headers, "date")?;
        let close_col = column_index(headers, "close")?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| FimateError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                FimateError::DataSource {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start_date || date >= end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default();
            let close: f64 = close_str.parse().map_err(|e| FimateError::DataSource {
                reason: format!("invalid close '{}' on {}: {}", close_str, date, e),
            })?;

            points.push(PricePoint::new(date, close));
        }

        points.sort_by_key(|p| p.date);
        tracing::debug!(ticker, rows = points.len(), "loaded prices");
        PriceSeries::new(points)
    }
}
