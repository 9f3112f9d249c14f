//! # Domain Types
//!
//! Core domain types used throughout the booking engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only for the engine)                                    │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │    Room      │  │   Service    │  │   FoodItem   │  │    Cat     │  │
//! │  │ price_per_day│  │ price        │  │ price        │  │ owner_id   │  │
//! │  │ is_available │  │ is_active    │  │ is_active    │  │ is_active  │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └─────┬──────┘  │
//! │         │                 │                 │                │         │
//! │  Ledger ▼                 ▼                 ▼                ▼         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ Booking  [check_in, check_out)  status  room/services/food/total │  │
//! │  │   ├── BookingServiceLine  (snapshot price)                       │  │
//! │  │   ├── BookingFoodLine     (snapshot price)                       │  │
//! │  │   └── Payment             (one-to-one, once confirmed)           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All identifiers are UUID v4 strings; all prices are integer cents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::stay::StayPeriod;

// =============================================================================
// Identity
// =============================================================================

/// Role of the caller, supplied by the external authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

/// The authenticated caller. Trusted as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn customer(user_id: impl Into<String>) -> Self {
        Actor {
            user_id: user_id.into(),
            role: Role::Customer,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Actor {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins act on anything; customers only on their own records.
    #[inline]
    pub fn can_act_for(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A room guests can be booked into.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Nightly rate in cents.
    pub price_per_day_cents: i64,
    /// How many cats (of one household) fit in the room.
    pub capacity: i64,
    /// Admin flag, independent of bookings.
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Room {
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_cents(self.price_per_day_cents)
    }
}

/// A bookable extra (grooming, play session, vet check).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Service {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A menu item served during the stay.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl FoodItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A registered cat.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cat {
    pub id: String,
    /// User id of the owner.
    pub owner_id: String,
    pub name: String,
    /// Archived cats cannot be booked.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Booking Status
// =============================================================================

/// Status of a booking. See [`crate::lifecycle`] for the legal edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting payment. A provisional hold.
    Pending,
    /// Paid.
    Confirmed,
    /// Cat is in the room.
    CheckedIn,
    /// Stay finished. Terminal.
    CheckedOut,
    /// Withdrawn. Terminal, frees the room.
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Cancelled,
    ];

    /// Storage and wire spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::CheckedOut | BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Meal Time
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

// =============================================================================
// Booking
// =============================================================================

/// A reservation in the ledger.
///
/// `total_price_cents` always equals the sum of the three component prices;
/// all four are frozen when the booking is created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: String,
    /// Owner (the customer the booking belongs to).
    pub user_id: String,
    pub cat_id: String,
    pub room_id: String,
    #[ts(as = "String")]
    pub check_in_date: NaiveDate,
    /// Exclusive: the cat leaves this morning.
    #[ts(as = "String")]
    pub check_out_date: NaiveDate,
    pub total_days: i64,
    pub room_price_cents: i64,
    pub services_price_cents: i64,
    pub food_price_cents: i64,
    pub total_price_cents: i64,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Half-open overlap with a stay.
    #[inline]
    pub fn overlaps(&self, period: &StayPeriod) -> bool {
        self.check_in_date < period.check_out() && period.check_in() < self.check_out_date
    }
}

/// A service attached to a booking with its price captured at booking time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookingServiceLine {
    pub id: String,
    pub booking_id: String,
    pub service_id: String,
    pub quantity: i64,
    /// Catalog price at booking time (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity (frozen).
    pub price_cents: i64,
    #[ts(as = "String")]
    pub service_date: NaiveDate,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A food order attached to a booking with its price captured at booking time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookingFoodLine {
    pub id: String,
    pub booking_id: String,
    pub food_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub price_cents: i64,
    #[ts(as = "String")]
    pub feeding_date: NaiveDate,
    pub meal_time: Option<MealTime>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A booking together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingDetails {
    pub booking: Booking,
    pub services: Vec<BookingServiceLine>,
    pub food: Vec<BookingFoodLine>,
}

// =============================================================================
// Payment
// =============================================================================

/// Record of the external payment that confirmed a booking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount_cents: i64,
    /// Gateway reference, if the signal carried one.
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// The `{booking_id, amount}` signal emitted by the payment collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub booking_id: String,
    pub amount: Money,
    #[serde(default)]
    pub reference: Option<String>,
}

// =============================================================================
// Requests
// =============================================================================

/// A requested service line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceRequest {
    pub service_id: String,
    /// Values below 1 are treated as 1.
    pub quantity: i64,
    /// Defaults to the check-in date.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ServiceRequest {
    pub fn new(service_id: impl Into<String>, quantity: i64) -> Self {
        ServiceRequest {
            service_id: service_id.into(),
            quantity,
            service_date: None,
            notes: None,
        }
    }
}

/// A requested food line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FoodRequest {
    pub food_id: String,
    /// Values below 1 are treated as 1.
    pub quantity: i64,
    /// Defaults to the check-in date.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub feeding_date: Option<NaiveDate>,
    #[serde(default)]
    pub meal_time: Option<MealTime>,
}

impl FoodRequest {
    pub fn new(food_id: impl Into<String>, quantity: i64) -> Self {
        FoodRequest {
            food_id: food_id.into(),
            quantity,
            feeding_date: None,
            meal_time: None,
        }
    }
}

/// Input of the booking orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateBooking {
    pub cat_id: String,
    pub room_id: String,
    #[ts(as = "String")]
    pub check_in: NaiveDate,
    #[ts(as = "String")]
    pub check_out: NaiveDate,
    #[serde(default)]
    pub services: Vec<ServiceRequest>,
    #[serde(default)]
    pub food: Vec<FoodRequest>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl CreateBooking {
    pub fn new(
        cat_id: impl Into<String>,
        room_id: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Self {
        CreateBooking {
            cat_id: cat_id.into(),
            room_id: room_id.into(),
            check_in,
            check_out,
            services: Vec::new(),
            food: Vec::new(),
            special_requests: None,
        }
    }

    pub fn with_service(mut self, service: ServiceRequest) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_food(mut self, food: FoodRequest) -> Self {
        self.food.push(food);
        self
    }

    pub fn with_special_requests(mut self, text: impl Into<String>) -> Self {
        self.special_requests = Some(text.into());
        self
    }
}

// =============================================================================
// Booking Filter
// =============================================================================

/// Criteria for listing bookings. Empty criteria match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub cat_id: Option<String>,
    /// Any of these statuses; empty means all.
    pub statuses: Vec<BookingStatus>,
    /// Only bookings whose stay overlaps this window.
    pub overlapping: Option<StayPeriod>,
    pub limit: Option<i64>,
}

impl BookingFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        BookingFilter {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn cat(mut self, cat_id: impl Into<String>) -> Self {
        self.cat_id = Some(cat_id.into());
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn overlapping(mut self, period: StayPeriod) -> Self {
        self.overlapping = Some(period);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_default() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn test_booking_status_spelling_matches_serde() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::CheckedOut.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::CheckedIn.is_terminal());
    }

    #[test]
    fn test_actor_ownership() {
        let owner = Actor::customer("u-1");
        let stranger = Actor::customer("u-2");
        let admin = Actor::admin("staff-1");

        assert!(owner.can_act_for("u-1"));
        assert!(!stranger.can_act_for("u-1"));
        assert!(admin.can_act_for("u-1"));
    }

    #[test]
    fn test_create_booking_deserializes_with_defaults() {
        let json = r#"{
            "cat_id": "cat-1",
            "room_id": "room-1",
            "check_in": "2024-05-01",
            "check_out": "2024-05-05"
        }"#;
        let request: CreateBooking = serde_json::from_str(json).unwrap();
        assert!(request.services.is_empty());
        assert!(request.food.is_empty());
        assert!(request.special_requests.is_none());
    }

    #[test]
    fn test_payment_confirmation_wire_shape() {
        let json = r#"{"booking_id": "b-1", "amount": 8500}"#;
        let signal: PaymentConfirmation = serde_json::from_str(json).unwrap();
        assert_eq!(signal.amount, Money::from_cents(8500));
        assert!(signal.reference.is_none());
    }
}
