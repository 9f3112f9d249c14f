//! # Booking Engine
//!
//! Creates bookings, drives their status and answers availability questions.
//! Every mutating operation is one unit of work: a single SQLite
//! transaction bounded by a deadline.
//!
//! ## Create Booking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_booking(actor, request)                                         │
//! │                                                                         │
//! │  validate_booking_request(today)      ← no I/O, fails fast             │
//! │       │                                                                 │
//! │  ┌────▼──────────── unit of work (deadline) ──────────────────────┐    │
//! │  │ BEGIN                                                          │    │
//! │  │ lock_room          ← other writers wait here (busy_timeout)    │    │
//! │  │ cat: exists, active, owned by actor (unless admin)             │    │
//! │  │ room: exists, is_available                                     │    │
//! │  │ find_conflict      ← under the lock, so the answer holds       │    │
//! │  │ load_snapshot + compute_price                                  │    │
//! │  │ insert booking + lines (prices captured)                       │    │
//! │  │ COMMIT                                                         │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │  Any error or an expired deadline drops the transaction: ROLLBACK.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writer Serialization
//! SQLite allows one writer at a time. The first statement of every unit of
//! work is a write, so two overlapping requests cannot both be between
//! `lock_room` and `COMMIT`. The second one sees the first one's booking
//! when it runs its conflict check.

use std::future::Future;
use std::time::Duration;

use catnap_core::lifecycle::authorize_transition;
use catnap_core::pricing::compute_price;
use catnap_core::validation::{validate_booking_request, validate_payment_amount, ValidatedBooking};
use catnap_core::{
    Actor, Booking, BookingDetails, BookingFilter, BookingFoodLine, BookingServiceLine,
    BookingStatus, StayCheck, CoreError, CreateBooking, EntityKind, FoodRequest, HoldPolicy,
    Money, Payment, PaymentConfirmation, Room, ServiceRequest, StayPeriod, PAYMENT_TOLERANCE,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::query::BookingQuery;
use crate::repository::{booking, cat, catalog, payment};

// =============================================================================
// Settings
// =============================================================================

/// Tunables of the booking engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Deadline for one unit of work, lock wait included.
    pub unit_of_work_timeout: Duration,
    /// Allowed difference between a payment and the booking total,
    /// capped at [`PAYMENT_TOLERANCE`].
    pub payment_tolerance: Money,
    /// Which statuses block a room.
    pub hold_policy: HoldPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            unit_of_work_timeout: Duration::from_secs(10),
            payment_tolerance: PAYMENT_TOLERANCE,
            hold_policy: HoldPolicy::default(),
        }
    }
}

/// Source of "today" for the not-in-the-past rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Current UTC date.
    #[default]
    System,
    /// A pinned date.
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Utc::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The booking orchestrator and ledger writer.
///
/// ## Usage
/// ```rust,ignore
/// let engine = BookingEngine::new(db).with_settings(config.settings());
///
/// let details = engine
///     .create_booking(&Actor::customer("u-1"), CreateBooking::new(cat_id, room_id, check_in, check_out))
///     .await?;
///
/// engine
///     .confirm_payment(&Actor::admin("payments"), PaymentConfirmation {
///         booking_id: details.booking.id.clone(),
///         amount: details.booking.total_price(),
///         reference: None,
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookingEngine {
    db: Database,
    settings: EngineSettings,
    clock: Clock,
}

impl BookingEngine {
    pub fn new(db: Database) -> Self {
        BookingEngine {
            db,
            settings: EngineSettings::default(),
            clock: Clock::System,
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a pending booking with captured prices.
    ///
    /// The booking belongs to the cat's owner; an admin may book on an
    /// owner's behalf. On any error nothing is written.
    pub async fn create_booking(&self, actor: &Actor, request: CreateBooking) -> DbResult<BookingDetails> {
        let valid = validate_booking_request(&request, self.clock.today())?;

        self.within_deadline("create_booking", async {
            let mut tx = self.db.pool().begin().await?;
            let details = self.create_in(&mut tx, actor, &request, &valid).await?;
            tx.commit().await?;

            info!(
                booking_id = %details.booking.id,
                room_id = %details.booking.room_id,
                check_in = %details.booking.check_in_date,
                check_out = %details.booking.check_out_date,
                total = %details.booking.total_price(),
                "Booking created"
            );
            Ok(details)
        })
        .await
    }

    async fn create_in(
        &self,
        conn: &mut SqliteConnection,
        actor: &Actor,
        request: &CreateBooking,
        valid: &ValidatedBooking,
    ) -> DbResult<BookingDetails> {
        let room_exists = catalog::lock_room(conn, &valid.room_id).await?;

        let cat = cat::fetch_cat(conn, &valid.cat_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::Cat, &valid.cat_id))?;
        if !cat.is_active {
            return Err(CoreError::inactive(EntityKind::Cat, &cat.id).into());
        }
        if !actor.can_act_for(&cat.owner_id) {
            return Err(CoreError::forbidden("cat belongs to another customer").into());
        }

        let room = self.bookable_room(conn, room_exists, &valid.room_id).await?;

        let check = StayCheck::new(&room.id, valid.stay, self.settings.hold_policy);
        self.ensure_free(conn, &check).await?;

        let service_ids: Vec<&str> = valid.services.iter().map(|l| l.item_id.as_str()).collect();
        let food_ids: Vec<&str> = valid.food.iter().map(|l| l.item_id.as_str()).collect();
        let snapshot = catalog::load_snapshot(conn, &service_ids, &food_ids).await?;

        let service_requests: Vec<ServiceRequest> = valid
            .services
            .iter()
            .map(|l| ServiceRequest::new(l.item_id.clone(), l.quantity))
            .collect();
        let food_requests: Vec<FoodRequest> = valid
            .food
            .iter()
            .map(|l| FoodRequest::new(l.item_id.clone(), l.quantity))
            .collect();

        let quote = compute_price(
            &room,
            valid.stay.nights(),
            &service_requests,
            &food_requests,
            &snapshot,
        )?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            user_id: cat.owner_id.clone(),
            cat_id: cat.id.clone(),
            room_id: room.id.clone(),
            check_in_date: valid.stay.check_in(),
            check_out_date: valid.stay.check_out(),
            total_days: quote.nights,
            room_price_cents: quote.breakdown.room.cents(),
            services_price_cents: quote.breakdown.services.cents(),
            food_price_cents: quote.breakdown.food.cents(),
            total_price_cents: quote.breakdown.total.cents(),
            status: BookingStatus::Pending,
            special_requests: valid.special_requests.clone(),
            created_at: now,
            updated_at: now,
        };
        booking::insert_booking(conn, &booking).await?;

        let mut services = Vec::with_capacity(quote.services.len());
        for priced in &quote.services {
            let line = BookingServiceLine {
                id: Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                service_id: priced.item_id.clone(),
                quantity: priced.quantity,
                unit_price_cents: priced.unit_price.cents(),
                price_cents: priced.line_total.cents(),
                service_date: valid.services[priced.index].date,
                notes: request.services[priced.index]
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                created_at: now,
            };
            booking::insert_service_line(conn, &line).await?;
            services.push(line);
        }

        let mut food = Vec::with_capacity(quote.food.len());
        for priced in &quote.food {
            let line = BookingFoodLine {
                id: Uuid::new_v4().to_string(),
                booking_id: booking.id.clone(),
                food_id: priced.item_id.clone(),
                quantity: priced.quantity,
                unit_price_cents: priced.unit_price.cents(),
                price_cents: priced.line_total.cents(),
                feeding_date: valid.food[priced.index].date,
                meal_time: request.food[priced.index].meal_time,
                created_at: now,
            };
            booking::insert_food_line(conn, &line).await?;
            food.push(line);
        }

        Ok(BookingDetails {
            booking,
            services,
            food,
        })
    }

    async fn bookable_room(
        &self,
        conn: &mut SqliteConnection,
        exists: bool,
        room_id: &str,
    ) -> DbResult<Room> {
        let room = if exists {
            catalog::fetch_room(conn, room_id).await?
        } else {
            None
        };

        let room = room.ok_or_else(|| CoreError::not_found(EntityKind::Room, room_id))?;
        if !room.is_available {
            return Err(CoreError::RoomUnavailable {
                room_id: room.id.clone(),
            }
            .into());
        }
        Ok(room)
    }

    async fn ensure_free(&self, conn: &mut SqliteConnection, check: &StayCheck) -> DbResult<()> {
        if let Some(blocking) = booking::find_conflict(conn, check).await? {
            warn!(
                room_id = %check.room_id,
                check_in = %check.period.check_in(),
                check_out = %check.period.check_out(),
                conflicting_booking_id = %blocking.id,
                "Booking rejected: room already taken"
            );
            return Err(check.conflict_error(&blocking).into());
        }
        Ok(())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Moves a booking along the status state machine.
    ///
    /// Moving to `confirmed` re-runs the conflict check against everyone
    /// else, so a provisional hold cannot be confirmed over a paid stay.
    pub async fn transition(&self, actor: &Actor, booking_id: &str, to: BookingStatus) -> DbResult<Booking> {
        self.within_deadline("transition", async {
            let mut tx = self.db.pool().begin().await?;
            let current = self.locked_booking(&mut tx, booking_id).await?;

            authorize_transition(actor, &current, to)?;
            if to == BookingStatus::Confirmed {
                self.recheck(&mut tx, &current).await?;
            }

            let updated = self.apply_status(&mut tx, current, to).await?;
            tx.commit().await?;

            info!(
                booking_id = %updated.id,
                status = %updated.status,
                actor = %actor.user_id,
                "Booking transition applied"
            );
            Ok(updated)
        })
        .await
    }

    /// Cancels a pending or confirmed booking. Owner or admin.
    ///
    /// The room is free for the dates as soon as this returns.
    pub async fn cancel(&self, actor: &Actor, booking_id: &str) -> DbResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Cancelled).await
    }

    /// Applies a payment signal: records the payment and confirms the booking.
    ///
    /// ## Rules
    /// - admin only (the payment collaborator acts as an admin)
    /// - booking must be `pending`
    /// - amount must match `total_price` within the configured tolerance
    /// - the room must still be free for the dates
    pub async fn confirm_payment(&self, actor: &Actor, signal: PaymentConfirmation) -> DbResult<Booking> {
        if !actor.is_admin() {
            return Err(CoreError::forbidden("payment confirmation requires an admin").into());
        }
        validate_payment_amount(signal.amount.cents())?;

        self.within_deadline("confirm_payment", async {
            let mut tx = self.db.pool().begin().await?;
            let current = self.locked_booking(&mut tx, &signal.booking_id).await?;

            authorize_transition(actor, &current, BookingStatus::Confirmed)?;

            let expected = current.total_price();
            if !expected.within_tolerance(signal.amount, self.payment_tolerance()) {
                warn!(
                    booking_id = %current.id,
                    expected = %expected,
                    received = %signal.amount,
                    "Payment does not match booking total"
                );
                return Err(CoreError::PaymentMismatch {
                    booking_id: current.id.clone(),
                    expected,
                    received: signal.amount,
                }
                .into());
            }

            self.recheck(&mut tx, &current).await?;

            let record = Payment {
                id: Uuid::new_v4().to_string(),
                booking_id: current.id.clone(),
                amount_cents: signal.amount.cents(),
                reference: signal.reference.clone(),
                created_at: Utc::now(),
            };
            payment::insert_payment(&mut tx, &record).await?;

            let updated = self.apply_status(&mut tx, current, BookingStatus::Confirmed).await?;
            tx.commit().await?;

            info!(
                booking_id = %updated.id,
                amount = %signal.amount,
                "Payment confirmed"
            );
            Ok(updated)
        })
        .await
    }

    fn payment_tolerance(&self) -> Money {
        self.settings.payment_tolerance.clamp(Money::zero(), PAYMENT_TOLERANCE)
    }

    async fn locked_booking(&self, conn: &mut SqliteConnection, booking_id: &str) -> DbResult<Booking> {
        let not_found = || CoreError::not_found(EntityKind::Booking, booking_id);

        if !booking::lock_booking(conn, booking_id).await? {
            return Err(not_found().into());
        }
        booking::fetch_booking(conn, booking_id)
            .await?
            .ok_or_else(|| not_found().into())
    }

    async fn recheck(&self, conn: &mut SqliteConnection, current: &Booking) -> DbResult<()> {
        let period = StayPeriod::new(current.check_in_date, current.check_out_date)?;
        let check = StayCheck::new(&current.room_id, period, self.settings.hold_policy)
            .excluding(&current.id);
        self.ensure_free(conn, &check).await
    }

    async fn apply_status(
        &self,
        conn: &mut SqliteConnection,
        mut current: Booking,
        to: BookingStatus,
    ) -> DbResult<Booking> {
        let now = Utc::now();
        booking::update_status(conn, &current.id, current.status, to, now).await?;
        current.status = to;
        current.updated_at = now;
        Ok(current)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `room_id` has a blocking booking overlapping the stay.
    pub async fn has_conflict(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<&str>,
    ) -> DbResult<bool> {
        let period = StayPeriod::new(check_in, check_out)?;
        let mut check = StayCheck::new(room_id, period, self.settings.hold_policy);
        if let Some(id) = exclude_booking_id {
            check = check.excluding(id);
        }

        self.within_deadline("has_conflict", async {
            let mut conn = self.db.pool().acquire().await?;
            Ok(booking::find_conflict(&mut conn, &check).await?.is_some())
        })
        .await
    }

    /// Rooms that can be booked for the stay.
    pub async fn available_rooms(&self, check_in: NaiveDate, check_out: NaiveDate) -> DbResult<Vec<Room>> {
        let period = StayPeriod::new(check_in, check_out)?;
        self.within_deadline(
            "available_rooms",
            self.db.catalog().available_rooms(&period, self.settings.hold_policy),
        )
        .await
    }

    /// Whether one room can be booked for the stay.
    pub async fn is_room_free(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> DbResult<bool> {
        let room = self
            .db
            .catalog()
            .get_room(room_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::Room, room_id))?;

        if !room.is_available {
            return Ok(false);
        }
        Ok(!self.has_conflict(room_id, check_in, check_out, None).await?)
    }

    /// Reads a booking. Owner or admin.
    pub async fn get_booking(&self, actor: &Actor, booking_id: &str) -> DbResult<Booking> {
        let booking = self
            .db
            .bookings()
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::Booking, booking_id))?;

        ensure_visible(actor, &booking)?;
        Ok(booking)
    }

    /// Reads a booking with its line items. Owner or admin.
    pub async fn get_booking_details(&self, actor: &Actor, booking_id: &str) -> DbResult<BookingDetails> {
        let details = self
            .db
            .bookings()
            .get_details(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found(EntityKind::Booking, booking_id))?;

        ensure_visible(actor, &details.booking)?;
        Ok(details)
    }

    /// Lists bookings matching `filter`.
    ///
    /// Customers only ever see their own bookings.
    pub async fn list_bookings(&self, actor: &Actor, mut filter: BookingFilter) -> DbResult<Vec<Booking>> {
        if !actor.is_admin() {
            match filter.user_id.as_deref() {
                Some(user_id) if user_id != actor.user_id => {
                    return Err(CoreError::forbidden("cannot list another customer's bookings").into());
                }
                _ => filter.user_id = Some(actor.user_id.clone()),
            }
        }

        let query = BookingQuery::from_filter(&filter);
        let bookings = self.db.bookings().list(&query).await?;

        debug!(actor = %actor.user_id, count = bookings.len(), "Bookings listed");
        Ok(bookings)
    }

    // =========================================================================
    // Deadline
    // =========================================================================

    /// Runs `work` under the unit-of-work deadline.
    ///
    /// On expiry the future is dropped, which rolls back any open
    /// transaction, and a retryable [`DbError::Timeout`] is returned.
    async fn within_deadline<T, F>(&self, operation: &'static str, work: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        let limit = self.settings.unit_of_work_timeout;

        match tokio::time::timeout(limit, work).await {
            Ok(result) => {
                if let Err(err) = &result {
                    if err.is_retryable() {
                        warn!(operation, error = %err, "Unit of work aborted, retryable");
                    }
                }
                result
            }
            Err(_) => {
                warn!(operation, after_ms = limit.as_millis() as u64, "Unit of work timed out");
                Err(DbError::Timeout {
                    operation: operation.to_string(),
                    after_ms: limit.as_millis() as u64,
                })
            }
        }
    }
}

fn ensure_visible(actor: &Actor, booking: &Booking) -> DbResult<()> {
    if !actor.can_act_for(&booking.user_id) {
        return Err(CoreError::forbidden("booking belongs to another customer").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests;
