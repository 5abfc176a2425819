use derive_more::{Add, AddAssign, Sub, SubAssign};
use num_traits::Zero;
use std::fmt::{self, Display};

/// Number of decimal places used when reporting totals.
pub const REPORT_PRECISION: u32 = 2;

/// A monetary amount as stored in the log: a 64-bit IEEE-754 float.
#[derive(Debug, Add, AddAssign, Sub, SubAssign, PartialEq, PartialOrd, Copy, Clone, Default)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Rounds the exact stored value to `places` decimal places.
    ///
    /// 2.675 is stored as 2.67499999... and rounds to 2.67.
    pub fn rounded(self, places: u32) -> Self {
        format!("{:.*}", places as usize, self.0)
            .parse()
            .map(Self)
            .unwrap_or(self)
    }

    /// Shortest representation that round-trips, always carrying a fractional part.
    pub fn unrounded(self) -> String {
        format!("{:?}", self.0)
    }
}

impl Zero for Amount {
    fn zero() -> Self {
        Self(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(REPORT_PRECISION as usize);
        write!(f, "{:.precision$}", self.0, precision = precision)
    }
}
