//! Market side held for a bar.

use std::fmt;

/// Always fully long or fully short; there is no flat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Long when the fast SMA is strictly above the slow SMA, short otherwise.
    pub fn from_crossover(sma_fast: f64, sma_slow: f64) -> Self {
        if sma_fast > sma_slow {
            Side::Long
        } else {
            Side::Short
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}
