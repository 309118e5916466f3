//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are undefined. A period longer than the series
//! leaves every bar undefined.

use crate::domain::error::FimateError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_sma(closes: &[f64], period: usize) -> Result<IndicatorSeries, FimateError> {
    if period == 0 {
        return Err(FimateError::invalid_parameter(
            "sma window",
            "window must be at least 1",
        ));
    }

    let mut values = vec![None; closes.len()];

    if closes.len() >= period {
        let mut sum: f64 = closes[..period].iter().sum();
        values[period - 1] = Some(sum / period as f64);

        for i in period..closes.len() {
            sum += closes[i] - closes[i - period];
            values[i] = Some(sum / period as f64);
        }
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}
