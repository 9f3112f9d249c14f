//! # Stay Periods
//!
//! A stay is the half-open date interval `[check_in, check_out)`: the cat
//! sleeps in the room every night from `check_in` up to, but not including,
//! the night of `check_out`.
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [a, b) and [c, d) overlap  ⇔  a < d  AND  c < b                        │
//! │                                                                         │
//! │  05-01      05-05      05-10                                            │
//! │    ├──────────┤                  A = [05-01, 05-05)                      │
//! │               ├──────────┤       B = [05-05, 05-10)   touching: OK      │
//! │         ├─────────┤              C = [05-03, 05-07)   overlaps A        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated half-open stay interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayPeriod {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayPeriod {
    /// Creates a stay, rejecting empty or inverted ranges.
    ///
    /// ## Example
    /// ```rust
    /// use catnap_core::stay::StayPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
    /// assert_eq!(StayPeriod::new(d(1), d(4)).unwrap().nights(), 3);
    /// assert!(StayPeriod::new(d(4), d(4)).is_err());
    /// ```
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, ValidationError> {
        if check_out <= check_in {
            return Err(ValidationError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(StayPeriod {
            check_in,
            check_out,
        })
    }

    #[inline]
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    #[inline]
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights, always >= 1.
    #[inline]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Half-open overlap test. Touching stays do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Whether a service or feeding date belongs to this stay.
    ///
    /// Both ends are included: a grooming session can be booked on the
    /// morning of departure.
    #[inline]
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date <= self.check_out
    }
}
