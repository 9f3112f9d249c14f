//! # Payment Repository
//!
//! One payment row per confirmed booking. The row is written by
//! `BookingEngine::confirm_payment` in the same unit of work as the
//! `pending → confirmed` transition.

use catnap_core::Payment;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

const PAYMENT_COLUMNS: &str = "id, booking_id, amount_cents, reference, created_at";

/// Repository for payment records.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// The payment that confirmed `booking_id`, if any.
    pub async fn for_booking(&self, booking_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = ?1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payment)
    }

    /// Sum of all recorded payments in cents.
    pub async fn total_received_cents(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount_cents), 0) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

pub(crate) async fn insert_payment(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(
        booking_id = %payment.booking_id,
        amount = payment.amount_cents,
        "Recording payment"
    );

    sqlx::query(
        "INSERT INTO payments (id, booking_id, amount_cents, reference, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&payment.id)
    .bind(&payment.booking_id)
    .bind(payment.amount_cents)
    .bind(&payment.reference)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
