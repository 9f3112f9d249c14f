//! # Validation Module
//!
//! Input validation for booking requests and catalog edits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (REST handler / admin form)                           │
//! │  ├── Deserialization into CreateBooking                                │
//! │  └── Authentication → Actor                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any lock is taken)                       │
//! │  ├── Stay dates: order, not in the past, maximum length                │
//! │  ├── Line items: quantity clamp, dates inside the stay                 │
//! │  └── Free text: trimmed, bounded                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (check_out_date > check_in_date)                            │
//! │  ├── CHECK on status values                                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catnap_core::validation::{normalize_quantity, validate_stay};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let stay = validate_stay(today, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(), today).unwrap();
//! assert_eq!(stay.nights(), 3);
//!
//! assert_eq!(normalize_quantity("quantity", 0).unwrap(), 1);
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::stay::StayPeriod;
use crate::types::CreateBooking;
use crate::{MAX_BOOKING_LINES, MAX_LINE_QUANTITY, MAX_SPECIAL_REQUESTS_LEN, MAX_STAY_NIGHTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Date Validators
// =============================================================================

/// Validates the stay dates of a new booking.
///
/// ## Rules
/// - `check_out` must be strictly after `check_in`
/// - `check_in` must not be before `today`
/// - at most [`MAX_STAY_NIGHTS`] nights
///
/// `today` is supplied by the caller; this crate never reads a clock.
///
/// ## Example
/// ```rust
/// use catnap_core::validation::validate_stay;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
/// assert!(validate_stay(d(3), d(7), d(1)).is_ok());
/// assert!(validate_stay(d(7), d(3), d(1)).is_err()); // inverted
/// assert!(validate_stay(d(3), d(3), d(1)).is_err()); // zero nights
/// assert!(validate_stay(d(3), d(7), d(5)).is_err()); // in the past
/// ```
pub fn validate_stay(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> ValidationResult<StayPeriod> {
    let stay = StayPeriod::new(check_in, check_out)?;

    if check_in < today {
        return Err(ValidationError::DateInPast {
            field: "check_in_date".to_string(),
            date: check_in,
            today,
        });
    }

    if stay.nights() > MAX_STAY_NIGHTS {
        return Err(ValidationError::OutOfRange {
            field: "nights".to_string(),
            min: 1,
            max: MAX_STAY_NIGHTS,
        });
    }

    Ok(stay)
}

/// Resolves a line item date against the stay.
///
/// `None` means "on the check-in day". A given date must fall within
/// `[check_in, check_out]`, both ends included.
pub fn resolve_line_date(
    field: &str,
    date: Option<NaiveDate>,
    stay: &StayPeriod,
) -> ValidationResult<NaiveDate> {
    let date = date.unwrap_or_else(|| stay.check_in());

    if !stay.covers_date(date) {
        return Err(ValidationError::DateOutsideStay {
            field: field.to_string(),
            date,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
        });
    }

    Ok(date)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Normalizes a line item quantity.
///
/// ## Rules
/// - Values below 1 become 1
/// - Values above [`MAX_LINE_QUANTITY`] are rejected
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Booking form: "Grooming × 0"                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  normalize_quantity(0) ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── qty < 1?  → 1 (one session)                                  │
/// │       ├── qty > 99? → Error: "quantity must be between 1 and 99"       │
/// │       └── OK        → priced as given                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn normalize_quantity(field: &str, qty: i64) -> ValidationResult<i64> {
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(qty.max(1))
}

/// Validates a catalog price in cents.
///
/// ## Example
/// ```rust
/// use catnap_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(2000).is_ok());
/// assert!(validate_price_cents(0).is_ok());     // complimentary
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents. Zero and negative amounts are rejected.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a room capacity.
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if !(1..=20).contains(&capacity) {
        return Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 1,
            max: 20,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (room, service, food item, cat).
///
/// Returns the trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Normalizes the free-text special requests field.
///
/// Trims whitespace; an empty result becomes `None`.
pub fn validate_special_requests(text: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_SPECIAL_REQUESTS_LEN {
        return Err(ValidationError::TooLong {
            field: "special_requests".to_string(),
            max: MAX_SPECIAL_REQUESTS_LEN,
        });
    }

    Ok(Some(text.to_string()))
}

/// Validates a required identifier and returns it trimmed.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(id.to_string())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use catnap_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// A booking request that passed every check that needs no storage.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub cat_id: String,
    pub room_id: String,
    pub stay: StayPeriod,
    pub services: Vec<ValidatedLine>,
    pub food: Vec<ValidatedLine>,
    pub special_requests: Option<String>,
}

/// A line item with its quantity normalized and its date resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    pub item_id: String,
    pub quantity: i64,
    pub date: NaiveDate,
}

/// Runs every storage-free check on a booking request.
///
/// Called before a transaction is opened, so invalid requests never touch
/// the database.
pub fn validate_booking_request(
    request: &CreateBooking,
    today: NaiveDate,
) -> ValidationResult<ValidatedBooking> {
    let cat_id = validate_id("cat_id", &request.cat_id)?;
    let room_id = validate_id("room_id", &request.room_id)?;
    let stay = validate_stay(request.check_in, request.check_out, today)?;

    let line_count = request.services.len() + request.food.len();
    if line_count > MAX_BOOKING_LINES {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 0,
            max: MAX_BOOKING_LINES as i64,
        });
    }

    let services = request
        .services
        .iter()
        .map(|s| {
            Ok(ValidatedLine {
                item_id: validate_id("service_id", &s.service_id)?,
                quantity: normalize_quantity("quantity", s.quantity)?,
                date: resolve_line_date("service_date", s.service_date, &stay)?,
            })
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    let food = request
        .food
        .iter()
        .map(|f| {
            Ok(ValidatedLine {
                item_id: validate_id("food_id", &f.food_id)?,
                quantity: normalize_quantity("quantity", f.quantity)?,
                date: resolve_line_date("feeding_date", f.feeding_date, &stay)?,
            })
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    let special_requests = validate_special_requests(request.special_requests.as_deref())?;

    Ok(ValidatedBooking {
        cat_id,
        room_id,
        stay,
        services,
        food,
        special_requests,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
