//! Log returns.
//!
//! R[i] = ln(C[i] / C[i-1]); the first bar has no prior close and is undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_log_returns(closes: &[f64]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(closes.len());
    if !closes.is_empty() {
        values.push(None);
    }
    values.extend(closes.windows(2).map(|w| Some((w[1] / w[0]).ln())));

    IndicatorSeries {
        indicator_type: IndicatorType::LogReturn,
        values,
    }
}
