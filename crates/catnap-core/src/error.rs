//! # Error Types
//!
//! Domain-specific error types for catnap-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catnap-core errors (this file)                                        │
//! │  ├── CoreError        - Booking rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  catnap-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, lock timeouts, + CoreError   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! │                                                                         │
//! │  Every error maps to one ErrorKind so callers can branch on the        │
//! │  category (offer other dates on Conflict, retry on Transient, ...)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::money::Money;
use crate::types::BookingStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// Category of a failure, as seen by the caller.
///
/// ## Caller Reaction
/// ```text
/// Validation  → show the message, do not retry
/// NotFound    → the referenced room/cat/service/food is missing or inactive
/// Conflict    → room taken for those dates, offer alternatives
/// Transition  → booking is not in a state that allows the change
/// Forbidden   → actor may not perform the operation
/// Transient   → lock timeout / busy database, resubmit the same request
/// Internal    → bug or storage failure
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Transition,
    Forbidden,
    Transient,
    Internal,
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Room,
    Cat,
    Service,
    Food,
    Booking,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Room => "Room",
            EntityKind::Cat => "Cat",
            EntityKind::Service => "Service",
            EntityKind::Food => "Food item",
            EntityKind::Booking => "Booking",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Booking rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// A referenced catalog item or cat exists but is deactivated.
    ///
    /// ## When This Occurs
    /// - Service or food item withdrawn from the menu
    /// - Cat profile archived by its owner
    #[error("{entity} is inactive: {id}")]
    Inactive { entity: EntityKind, id: String },

    /// Room exists but an administrator took it off the market.
    #[error("Room {room_id} is not available for booking")]
    RoomUnavailable { room_id: String },

    /// The room already has a blocking booking overlapping the stay.
    ///
    /// ## User Workflow
    /// ```text
    /// Request: room R, [05-03, 05-07)
    ///      │
    ///      ▼
    /// Existing confirmed booking B on R: [05-01, 05-05)
    ///      │
    ///      ▼
    /// Conflict { room_id: R, conflicting_booking_id: B, ... }
    ///      │
    ///      ▼
    /// UI offers other dates or rooms
    /// ```
    #[error("Room {room_id} is already booked between {check_in} and {check_out} (booking {conflicting_booking_id})")]
    Conflict {
        room_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
        conflicting_booking_id: String,
    },

    /// Requested status change is not an edge of the state machine.
    #[error("Invalid transition: booking is {from}, cannot move to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// The actor is not allowed to act on this record.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// A payment signal does not match the booking total.
    #[error("Payment of {received} does not match booking {booking_id} total {expected}")]
    PaymentMismatch {
        booking_id: String,
        expected: Money,
        received: Money,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for an entity and id.
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an Inactive error for an entity and id.
    pub fn inactive(entity: EntityKind, id: impl Into<String>) -> Self {
        CoreError::Inactive {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        CoreError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. }
            | CoreError::Inactive { .. }
            | CoreError::RoomUnavailable { .. } => ErrorKind::NotFound,
            CoreError::Conflict { .. } => ErrorKind::Conflict,
            CoreError::InvalidTransition { .. } => ErrorKind::Transition,
            CoreError::Forbidden { .. } => ErrorKind::Forbidden,
            CoreError::PaymentMismatch { .. } | CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any database work starts, so they never leave side effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A date lies before the caller's current date.
    #[error("{field} {date} is in the past (today is {today})")]
    DateInPast {
        field: String,
        date: NaiveDate,
        today: NaiveDate,
    },

    /// Check-out is not strictly after check-in.
    #[error("check_out_date {check_out} must be after check_in_date {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// A line item date falls outside the stay.
    #[error("{field} {date} is outside the stay {check_in}..{check_out}")]
    DateOutsideStay {
        field: String,
        date: NaiveDate,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let err = CoreError::not_found(EntityKind::Service, "svc-42");
        assert_eq!(err.to_string(), "Service not found: svc-42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = CoreError::InvalidTransition {
            from: BookingStatus::CheckedOut,
            to: BookingStatus::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition: booking is checked_out, cannot move to confirmed"
        );
        assert_eq!(err.kind(), ErrorKind::Transition);
    }

    #[test]
    fn test_conflict_is_distinct_from_validation() {
        let conflict = CoreError::Conflict {
            room_id: "room-1".to_string(),
            check_in: date(5, 3),
            check_out: date(5, 7),
            conflicting_booking_id: "b-1".to_string(),
        };
        let invalid: CoreError = ValidationError::InvalidDateRange {
            check_in: date(5, 7),
            check_out: date(5, 3),
        }
        .into();

        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(invalid.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unavailable_room_reports_as_not_found() {
        let err = CoreError::RoomUnavailable {
            room_id: "room-9".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::DateInPast {
            field: "check_in_date".to_string(),
            date: date(1, 1),
            today: date(1, 2),
        };
        assert_eq!(
            err.to_string(),
            "check_in_date 2024-01-01 is in the past (today is 2024-01-02)"
        );
    }
}
