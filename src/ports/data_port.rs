//! Price data access port trait.

use crate::domain::error::FimateError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Close prices for `ticker` dated in `[start_date, end_date)`.
    ///
    /// An unknown ticker or a range without data yields an empty series,
    /// not an error.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FimateError>;
}
