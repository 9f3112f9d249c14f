//! # Money Module
//!
//! Provides the `Money` type for every price in the engine: nightly room
//! rates, service and food prices, captured line prices and booking totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With binary floats:                                                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A booking total of room + services + food drifts by a cent, and the   │
//! │  payment signal no longer matches the stored total.                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    2000 cents × 3 nights + 1000 × 2 + 500 × 1 = 8500 cents, exactly    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catnap_core::money::Money;
//!
//! let nightly = Money::from_cents(2000);                // $20.00
//! let room = nightly.checked_multiply(3).unwrap();       // $60.00
//! let total = room.checked_add(Money::from_cents(2500)); // $85.00
//! assert_eq!(total, Some(Money::from_cents(8500)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Room.price_per_day ──► × nights ─────────────┐
/// Service.price ───────► × quantity ──► Σ ─────┼──► Booking.total_price
/// FoodItem.price ──────► × quantity ──► Σ ─────┘           │
///                                                          ▼
///                               PaymentConfirmation.amount (±1 cent)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use catnap_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies by a quantity (nights, portions, sessions), `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use catnap_core::money::Money;
    ///
    /// let grooming = Money::from_cents(1000);
    /// assert_eq!(grooming.checked_multiply(2), Some(Money::from_cents(2000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply(2), None);
    /// ```
    #[inline]
    pub fn checked_multiply(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Checked addition, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Sums amounts, `None` if any partial sum overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Checks whether two amounts differ by at most `tolerance`.
    ///
    /// ## User Workflow
    /// ```text
    /// Booking total:    $85.00
    /// Payment signal:   $84.99
    ///      │
    ///      ▼
    /// within_tolerance(1 cent) ← THIS FUNCTION
    ///      │
    ///      ├── |diff| <= tolerance → confirm booking
    ///      └── otherwise           → PaymentMismatch
    /// ```
    #[inline]
    pub fn within_tolerance(&self, other: Money, tolerance: Money) -> bool {
        self.0.abs_diff(other.0) <= tolerance.0.unsigned_abs()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display for logs and error messages; presentation layers format their own.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(8500)), "$85.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_booking_total_is_exact() {
        let room = Money::from_cents(2000).checked_multiply(3).unwrap();
        let services = Money::from_cents(1000).checked_multiply(2).unwrap();
        let food = Money::from_cents(500);

        let total = Money::checked_sum([room, services, food]).unwrap();
        assert_eq!(total.cents(), 8500);
    }

    #[test]
    fn test_within_tolerance() {
        let total = Money::from_cents(8500);
        let tolerance = Money::from_cents(1);

        assert!(total.within_tolerance(Money::from_cents(8500), tolerance));
        assert!(total.within_tolerance(Money::from_cents(8499), tolerance));
        assert!(total.within_tolerance(Money::from_cents(8501), tolerance));
        assert!(!total.within_tolerance(Money::from_cents(8498), tolerance));
        assert!(!total.within_tolerance(Money::from_cents(8502), tolerance));
    }

    #[test]
    fn test_within_tolerance_at_the_extremes() {
        let tolerance = Money::from_cents(1);
        assert!(!Money::from_cents(i64::MAX).within_tolerance(Money::from_cents(i64::MIN), tolerance));
        assert!(Money::from_cents(i64::MAX).within_tolerance(Money::from_cents(i64::MAX - 1), tolerance));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply(2), None);
        assert_eq!(
            Money::from_cents(250).checked_multiply(4),
            Some(Money::from_cents(1000))
        );

        let half = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(Money::checked_sum([half, half]), None);
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    /// Ten tenths of a dollar sum to exactly one dollar, unlike 0.1f64 × 10.
    #[test]
    fn test_no_cent_drift() {
        let dime = Money::from_cents(10);
        let total = Money::checked_sum(std::iter::repeat(dime).take(10)).unwrap();
        assert_eq!(total, Money::from_cents(100));
    }
}
