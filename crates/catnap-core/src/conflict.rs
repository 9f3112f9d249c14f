//! # Conflict Rules
//!
//! Decides which existing bookings block a room for a proposed stay.
//!
//! ## Hold Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  status        Provisional (default)     Blocking                       │
//! │  ───────────   ─────────────────────     ────────                       │
//! │  pending       does not block            blocks                         │
//! │  confirmed     blocks                    blocks                         │
//! │  checked_in    blocks                    blocks                         │
//! │  checked_out   does not block            does not block                 │
//! │  cancelled     does not block            does not block                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Under the provisional policy several pending requests may hold the same
//! dates; whichever pays first wins, because confirmation re-runs the check
//! against confirmed and checked-in bookings.
//!
//! The storage layer narrows candidates with SQL built from a
//! [`StayCheck`]; [`StayCheck::first_conflict`] makes the decision.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::stay::StayPeriod;
use crate::types::{Booking, BookingStatus};

/// Which statuses hold a room against other bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPolicy {
    /// Only paid stays block; pending bookings are provisional holds.
    #[default]
    Provisional,
    /// Every non-terminal booking blocks, pending included.
    Blocking,
}

impl HoldPolicy {
    /// Statuses that block a room under this policy.
    pub fn blocking_statuses(&self) -> &'static [BookingStatus] {
        match self {
            HoldPolicy::Provisional => &[BookingStatus::Confirmed, BookingStatus::CheckedIn],
            HoldPolicy::Blocking => &[
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::CheckedIn,
            ],
        }
    }

    #[inline]
    pub fn blocks(&self, status: BookingStatus) -> bool {
        self.blocking_statuses().contains(&status)
    }
}

/// A question to the conflict checker: "is `room_id` free for `period`?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayCheck {
    pub room_id: String,
    pub period: StayPeriod,
    /// Ignore this booking (re-checking a booking against everyone else).
    pub exclude_booking_id: Option<String>,
    pub policy: HoldPolicy,
}

impl StayCheck {
    pub fn new(room_id: impl Into<String>, period: StayPeriod, policy: HoldPolicy) -> Self {
        StayCheck {
            room_id: room_id.into(),
            period,
            exclude_booking_id: None,
            policy,
        }
    }

    pub fn excluding(mut self, booking_id: impl Into<String>) -> Self {
        self.exclude_booking_id = Some(booking_id.into());
        self
    }

    /// Whether `booking` blocks the requested stay.
    pub fn is_blocked_by(&self, booking: &Booking) -> bool {
        booking.room_id == self.room_id
            && self.exclude_booking_id.as_deref() != Some(booking.id.as_str())
            && self.policy.blocks(booking.status)
            && booking.overlaps(&self.period)
    }

    /// First blocking booking among the candidates, if any.
    pub fn first_conflict<'a, I>(&self, candidates: I) -> Option<&'a Booking>
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        candidates.into_iter().find(|b| self.is_blocked_by(b))
    }

    /// Builds the conflict error for a blocking booking.
    pub fn conflict_error(&self, blocking: &Booking) -> CoreError {
        CoreError::Conflict {
            room_id: self.room_id.clone(),
            check_in: self.period.check_in(),
            check_out: self.period.check_out(),
            conflicting_booking_id: blocking.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn booking(id: &str, room: &str, from: NaiveDate, to: NaiveDate, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            cat_id: "cat-1".to_string(),
            room_id: room.to_string(),
            check_in_date: from,
            check_out_date: to,
            total_days: (to - from).num_days(),
            room_price_cents: 0,
            services_price_cents: 0,
            food_price_cents: 0,
            total_price_cents: 0,
            status,
            special_requests: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn check(from: NaiveDate, to: NaiveDate, policy: HoldPolicy) -> StayCheck {
        StayCheck::new("room-1", StayPeriod::new(from, to).unwrap(), policy)
    }

    #[test]
    fn test_overlapping_confirmed_booking_blocks() {
        let existing = booking("a", "room-1", d(5, 1), d(5, 5), BookingStatus::Confirmed);
        let p = check(d(5, 3), d(5, 7), HoldPolicy::Provisional);
        assert!(p.is_blocked_by(&existing));
    }

    #[test]
    fn test_touching_booking_does_not_block() {
        let existing = booking("a", "room-1", d(5, 1), d(5, 5), BookingStatus::CheckedIn);
        assert!(!check(d(5, 5), d(5, 10), HoldPolicy::Provisional).is_blocked_by(&existing));
        assert!(!check(d(4, 28), d(5, 1), HoldPolicy::Provisional).is_blocked_by(&existing));
    }

    #[test]
    fn test_pending_depends_on_policy() {
        let existing = booking("a", "room-1", d(5, 1), d(5, 5), BookingStatus::Pending);
        assert!(!check(d(5, 2), d(5, 3), HoldPolicy::Provisional).is_blocked_by(&existing));
        assert!(check(d(5, 2), d(5, 3), HoldPolicy::Blocking).is_blocked_by(&existing));
    }

    #[test]
    fn test_terminal_bookings_never_block() {
        for status in [BookingStatus::Cancelled, BookingStatus::CheckedOut] {
            let existing = booking("a", "room-1", d(5, 1), d(5, 5), status);
            assert!(!check(d(5, 1), d(5, 5), HoldPolicy::Blocking).is_blocked_by(&existing));
        }
    }

    #[test]
    fn test_excluded_booking_is_ignored() {
        let existing = booking("a", "room-1", d(5, 1), d(5, 5), BookingStatus::Confirmed);
        let p = check(d(5, 1), d(5, 5), HoldPolicy::Provisional).excluding("a");
        assert!(!p.is_blocked_by(&existing));
    }

    #[test]
    fn test_other_room_is_ignored() {
        let existing = booking("a", "room-2", d(5, 1), d(5, 5), BookingStatus::Confirmed);
        assert!(!check(d(5, 1), d(5, 5), HoldPolicy::Provisional).is_blocked_by(&existing));
    }

    #[test]
    fn test_first_conflict_and_error() {
        let bookings = vec![
            booking("a", "room-1", d(5, 1), d(5, 5), BookingStatus::Cancelled),
            booking("b", "room-1", d(5, 4), d(5, 6), BookingStatus::Confirmed),
        ];
        let p = check(d(5, 3), d(5, 7), HoldPolicy::Provisional);
        let hit = p.first_conflict(&bookings).unwrap();
        assert_eq!(hit.id, "b");

        match p.conflict_error(hit) {
            CoreError::Conflict {
                conflicting_booking_id,
                check_in,
                ..
            } => {
                assert_eq!(conflicting_booking_id, "b");
                assert_eq!(check_in, d(5, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
