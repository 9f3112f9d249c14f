//! # Booking Repository
//!
//! The booking ledger: bookings and their captured line items.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE (engine, one unit of work)                                  │
//! │     └── insert_booking() → Booking { status: Pending }                 │
//! │     └── insert_service_line() × n   (price captured)                   │
//! │     └── insert_food_line()    × m   (price captured)                   │
//! │                                                                         │
//! │  2. TRANSITION (engine, one unit of work)                              │
//! │     └── update_status(from, to)  guarded by WHERE status = from        │
//! │                                                                         │
//! │  3. READ (this repository, pool)                                       │
//! │     └── get / get_details / list                                       │
//! │                                                                         │
//! │  Bookings are never deleted; cancellation is a status.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catnap_core::{
    Booking, BookingDetails, BookingFoodLine, BookingServiceLine, BookingStatus, StayCheck,
};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::query::{BookingQuery, BOOKING_COLUMNS};

const SERVICE_LINE_COLUMNS: &str = "id, booking_id, service_id, quantity, unit_price_cents, \
    price_cents, service_date, notes, created_at";

const FOOD_LINE_COLUMNS: &str = "id, booking_id, food_id, quantity, unit_price_cents, \
    price_cents, feeding_date, meal_time, created_at";

/// Read access to the booking ledger.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch_booking(&mut conn, id).await
    }

    /// Gets a booking with its service and food lines.
    pub async fn get_details(&self, id: &str) -> DbResult<Option<BookingDetails>> {
        let mut conn = self.pool.acquire().await?;
        let Some(booking) = fetch_booking(&mut conn, id).await? else {
            return Ok(None);
        };
        let (services, food) = fetch_lines(&mut conn, id).await?;

        Ok(Some(BookingDetails {
            booking,
            services,
            food,
        }))
    }

    /// Runs a booking query.
    pub async fn list(&self, query: &BookingQuery) -> DbResult<Vec<Booking>> {
        let mut qb = query.to_builder();
        let bookings = qb.build_query_as::<Booking>().fetch_all(&self.pool).await?;
        Ok(bookings)
    }

    /// Counts bookings (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit-of-Work Operations
// =============================================================================

/// Takes the write lock on behalf of an existing booking.
///
/// Returns `false` when the booking does not exist.
pub(crate) async fn lock_booking(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
    let result = sqlx::query("UPDATE bookings SET updated_at = updated_at WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    debug!(booking_id = %id, "Booking write lock acquired");
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn fetch_booking(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(booking)
}

pub(crate) async fn fetch_lines(
    conn: &mut SqliteConnection,
    booking_id: &str,
) -> DbResult<(Vec<BookingServiceLine>, Vec<BookingFoodLine>)> {
    let services = sqlx::query_as::<_, BookingServiceLine>(&format!(
        "SELECT {SERVICE_LINE_COLUMNS} FROM booking_services WHERE booking_id = ?1 \
         ORDER BY service_date ASC, created_at ASC, id ASC"
    ))
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await?;

    let food = sqlx::query_as::<_, BookingFoodLine>(&format!(
        "SELECT {FOOD_LINE_COLUMNS} FROM booking_food WHERE booking_id = ?1 \
         ORDER BY feeding_date ASC, created_at ASC, id ASC"
    ))
    .bind(booking_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok((services, food))
}

/// First booking blocking the requested stay, if any.
pub(crate) async fn find_conflict(
    conn: &mut SqliteConnection,
    check: &StayCheck,
) -> DbResult<Option<Booking>> {
    let mut qb = BookingQuery::from_stay_check(check).to_builder();
    let candidates = qb.build_query_as::<Booking>().fetch_all(&mut *conn).await?;

    Ok(check.first_conflict(&candidates).cloned())
}

pub(crate) async fn insert_booking(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
    debug!(
        id = %booking.id,
        room_id = %booking.room_id,
        total_cents = booking.total_price_cents,
        "Inserting booking"
    );

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, user_id, cat_id, room_id,
            check_in_date, check_out_date, total_days,
            room_price_cents, services_price_cents, food_price_cents, total_price_cents,
            status, special_requests, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7,
            ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15
        )
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.user_id)
    .bind(&booking.cat_id)
    .bind(&booking.room_id)
    .bind(booking.check_in_date)
    .bind(booking.check_out_date)
    .bind(booking.total_days)
    .bind(booking.room_price_cents)
    .bind(booking.services_price_cents)
    .bind(booking.food_price_cents)
    .bind(booking.total_price_cents)
    .bind(booking.status)
    .bind(&booking.special_requests)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_service_line(
    conn: &mut SqliteConnection,
    line: &BookingServiceLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO booking_services (
            id, booking_id, service_id, quantity, unit_price_cents, price_cents,
            service_date, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&line.id)
    .bind(&line.booking_id)
    .bind(&line.service_id)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.price_cents)
    .bind(line.service_date)
    .bind(&line.notes)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_food_line(conn: &mut SqliteConnection, line: &BookingFoodLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO booking_food (
            id, booking_id, food_id, quantity, unit_price_cents, price_cents,
            feeding_date, meal_time, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&line.id)
    .bind(&line.booking_id)
    .bind(&line.food_id)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.price_cents)
    .bind(line.feeding_date)
    .bind(line.meal_time)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Moves a booking from `from` to `to`.
///
/// Guarded by `WHERE status = from`, so a status changed underneath the
/// caller is never overwritten.
pub(crate) async fn update_status(
    conn: &mut SqliteConnection,
    id: &str,
    from: BookingStatus,
    to: BookingStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE bookings SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(format!("Booking ({from})"), id));
    }

    debug!(booking_id = %id, %from, %to, "Booking status updated");
    Ok(())
}
