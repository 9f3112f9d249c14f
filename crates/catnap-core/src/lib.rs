//! # catnap-core: Pure Booking Logic for Catnap Hotel
//!
//! This crate holds the rules of the booking & room-availability engine as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catnap Hotel Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Callers (REST handlers, admin dashboard, webhooks)     │   │
//! │  │     authenticated elsewhere, pass Actor { user_id, role }       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                catnap-db :: BookingEngine                       │   │
//! │  │      create_booking, transition, confirm_payment, ...           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls into                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catnap-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌───────────┐ ┌───────┐ │   │
//! │  │   │  stay   │ │ conflict │ │ pricing │ │ lifecycle │ │ money │ │   │
//! │  │   │ [in,out)│ │  check   │ │  quote  │ │  status   │ │ cents │ │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └───────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Room, Cat, Booking, line items, requests)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stay`] - Half-open stay periods and overlap
//! - [`conflict`] - Which bookings block a room
//! - [`pricing`] - Price calculator over a catalog snapshot
//! - [`lifecycle`] - Booking status state machine and who may drive it
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catnap_core::money::Money;
//! use catnap_core::stay::StayPeriod;
//! use chrono::NaiveDate;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
//! let first = StayPeriod::new(d(1), d(5)).unwrap();
//! let second = StayPeriod::new(d(5), d(10)).unwrap();
//!
//! // Check-out morning and check-in afternoon share a date, not a night
//! assert!(!first.overlaps(&second));
//!
//! let nightly = Money::from_cents(2000);
//! assert_eq!(nightly.checked_multiply(first.nights()), Some(Money::from_cents(8000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod stay;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use conflict::{StayCheck, HoldPolicy};
pub use error::{CoreError, CoreResult, EntityKind, ErrorKind, ValidationError};
pub use money::Money;
pub use pricing::{CatalogEntry, CatalogSnapshot, PriceBreakdown, PriceQuote, PricedLine};
pub use stay::StayPeriod;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single service or food line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 100 instead of 10 meals).
pub const MAX_LINE_QUANTITY: i64 = 99;

/// Maximum number of service plus food lines on one booking.
pub const MAX_BOOKING_LINES: usize = 50;

/// Longest stay accepted in a single booking, in nights.
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Maximum length of the free-text special requests field.
pub const MAX_SPECIAL_REQUESTS_LEN: usize = 1000;

/// Largest difference allowed between a payment and a booking total.
///
/// Rounding only; a configured tolerance above this is rejected or capped.
pub const PAYMENT_TOLERANCE: Money = Money::from_cents(1);
