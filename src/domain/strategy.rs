//! SMA crossover parameters.

use crate::domain::error::FimateError;
use std::fmt;

/// Window pair of the crossover: `fast` is SMA1, `slow` is SMA2.
///
/// `fast < slow` is the usual setup but is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmaParams {
    pub fast: usize,
    pub slow: usize,
}

impl SmaParams {
    pub fn new(fast: usize, slow: usize) -> Result<Self, FimateError> {
        validate_window("sma_fast", fast)?;
        validate_window("sma_slow", slow)?;
        Ok(Self { fast, slow })
    }

    pub fn max_window(&self) -> usize {
        self.fast.max(self.slow)
    }

    /// Bars needed before the first strategy return can be computed: the
    /// warmup of the longer SMA (at least one bar for the first log return)
    /// plus two usable rows.
    pub fn min_bars(&self) -> usize {
        self.max_window().max(2) + 1
    }
}

pub(crate) fn validate_window(name: &str, window: usize) -> Result<(), FimateError> {
    if window == 0 {
        return Err(FimateError::invalid_parameter(
            name,
            "window must be at least 1",
        ));
    }
    Ok(())
}

impl fmt::Display for SmaParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SMA1={}, SMA2={}", self.fast, self.slow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fields() {
        let p = SmaParams::new(42, 252).unwrap();
        assert_eq!(p.fast, 42);
        assert_eq!(p.slow, 252);
        assert_eq!(p.max_window(), 252);
    }

    #[test]
    fn zero_window_rejected() {
        let err = SmaParams::new(0, 10).unwrap_err();
        assert!(matches!(err, FimateError::InvalidParameter { ref name, .. } if name == "sma_fast"));

        let err = SmaParams::new(10, 0).unwrap_err();
        assert!(matches!(err, FimateError::InvalidParameter { ref name, .. } if name == "sma_slow"));
    }

    #[test]
    fn fast_above_slow_allowed() {
        assert!(SmaParams::new(50, 20).is_ok());
    }

    #[test]
    fn min_bars() {
        assert_eq!(SmaParams::new(1, 1).unwrap().min_bars(), 3);
        assert_eq!(SmaParams::new(2, 3).unwrap().min_bars(), 4);
        assert_eq!(SmaParams::new(20, 5).unwrap().min_bars(), 21);
    }

    #[test]
    fn display() {
        assert_eq!(SmaParams::new(2, 3).unwrap().to_string(), "SMA1=2, SMA2=3");
    }
}
