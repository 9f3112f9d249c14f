//! # Booking Lifecycle
//!
//! The status state machine and the permission rules for driving it.
//!
//! ## State Machine
//! ```text
//!                 payment confirmed          arrival           departure
//!   ┌─────────┐  ──────────────────►  ┌───────────┐  ───────►  ┌────────────┐  ───────►  ┌─────────────┐
//!   │ pending │                        │ confirmed │            │ checked_in │            │ checked_out │
//!   └────┬────┘                        └─────┬─────┘            └────────────┘            └─────────────┘
//!        │ cancel                            │ cancel
//!        ▼                                   ▼
//!   ┌─────────────────────────────────────────────┐
//!   │                  cancelled                  │
//!   └─────────────────────────────────────────────┘
//! ```
//!
//! ## Who May Drive It
//! | Edge                       | Owner | Admin |
//! |----------------------------|-------|-------|
//! | pending → confirmed        |       |   ✓   |
//! | pending → cancelled        |   ✓   |   ✓   |
//! | confirmed → cancelled      |   ✓   |   ✓   |
//! | confirmed → checked_in     |       |   ✓   |
//! | checked_in → checked_out   |       |   ✓   |
//!
//! Legality is checked before permission, so asking for an impossible edge
//! reports the transition error even to a caller who could not have made it.

use crate::error::{CoreError, CoreResult};
use crate::types::{Actor, Booking, BookingStatus};

impl BookingStatus {
    /// Whether `self → next` is an edge of the state machine.
    pub const fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
        )
    }

    /// Statuses reachable in one step.
    pub fn next_statuses(&self) -> Vec<BookingStatus> {
        BookingStatus::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

/// Checks that `actor` may move `booking` to `to`.
///
/// Customers asking about someone else's booking are refused before the
/// edge is checked, so the error never reveals that booking's status.
pub fn authorize_transition(actor: &Actor, booking: &Booking, to: BookingStatus) -> CoreResult<()> {
    if !actor.is_admin() && !booking.is_owned_by(&actor.user_id) {
        return Err(CoreError::forbidden("booking belongs to another customer"));
    }

    if !booking.status.can_transition_to(to) {
        return Err(CoreError::InvalidTransition {
            from: booking.status,
            to,
        });
    }

    if actor.is_admin() {
        return Ok(());
    }

    match to {
        BookingStatus::Cancelled => Ok(()),
        other => Err(CoreError::forbidden(format!(
            "only staff may move a booking to {other}"
        ))),
    }
}
