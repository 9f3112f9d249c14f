//! # Query Specification
//!
//! Booking lookups are described as an ordered list of typed predicates and
//! rendered with [`sqlx::QueryBuilder`]. Every value becomes a bound
//! parameter; no caller-supplied text is ever spliced into SQL.
//!
//! ## Rendering
//! ```text
//! BookingQuery
//!   .filter(RoomId  = "room-1")          WHERE room_id = ?
//!   .filter(CheckIn < 2024-05-07)          AND check_in_date < ?
//!   .filter(CheckOut > 2024-05-03)         AND check_out_date > ?
//!   .filter(Status IN [confirmed, ...])    AND status IN (?, ?)
//!   .order_by(CheckIn, Asc)              ORDER BY check_in_date ASC
//!   .limit(50)                           LIMIT ?
//! ```
//!
//! The stay check and the listing filter both lower into this form, so
//! the overlap predicate is written exactly once.

use catnap_core::{BookingFilter, BookingStatus, StayCheck, HoldPolicy, StayPeriod};
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};

/// Columns of `bookings` in `SELECT` order, matching [`catnap_core::Booking`].
pub(crate) const BOOKING_COLUMNS: &str = "id, user_id, cat_id, room_id, check_in_date, \
    check_out_date, total_days, room_price_cents, services_price_cents, food_price_cents, \
    total_price_cents, status, special_requests, created_at, updated_at";

/// Upper bound on rows returned by a listing.
pub const MAX_LIST_LIMIT: i64 = 500;

// =============================================================================
// Building Blocks
// =============================================================================

/// A filterable column of the `bookings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    UserId,
    CatId,
    RoomId,
    CheckInDate,
    CheckOutDate,
    Status,
    CreatedAt,
}

impl Column {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::UserId => "user_id",
            Column::CatId => "cat_id",
            Column::RoomId => "room_id",
            Column::CheckInDate => "check_in_date",
            Column::CheckOutDate => "check_out_date",
            Column::Status => "status",
            Column::CreatedAt => "created_at",
        }
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Date(NaiveDate),
    Status(BookingStatus),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<BookingStatus> for Value {
    fn from(s: BookingStatus) -> Self {
        Value::Status(s)
    }
}

/// One `WHERE` clause term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Column, Value),
    NotEq(Column, Value),
    Lt(Column, Value),
    Gt(Column, Value),
    /// An empty list matches nothing.
    In(Column, Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

// =============================================================================
// Booking Query
// =============================================================================

/// A `SELECT` over `bookings` as data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingQuery {
    predicates: Vec<Predicate>,
    order: Vec<(Column, Direction)>,
    limit: Option<i64>,
}

impl BookingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, column: Column, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Adds the half-open overlap test against `period`.
    pub fn overlapping(self, period: &StayPeriod) -> Self {
        self.filter(Predicate::Lt(Column::CheckInDate, period.check_out().into()))
            .filter(Predicate::Gt(Column::CheckOutDate, period.check_in().into()))
    }

    /// Candidates that may block the requested stay.
    ///
    /// The SQL narrows by room, dates, status and exclusion; the caller still
    /// confirms each row with [`StayCheck::first_conflict`].
    pub fn from_stay_check(check: &StayCheck) -> Self {
        let mut query = BookingQuery::new()
            .filter(Predicate::Eq(Column::RoomId, check.room_id.clone().into()))
            .overlapping(&check.period)
            .filter(blocking_statuses(check.policy));

        if let Some(exclude) = &check.exclude_booking_id {
            query = query.filter(Predicate::NotEq(Column::Id, exclude.clone().into()));
        }

        query.order_by(Column::CheckInDate, Direction::Asc)
    }

    /// Listing query for a [`BookingFilter`].
    ///
    /// Newest first; the limit is clamped to `1..=MAX_LIST_LIMIT`.
    pub fn from_filter(filter: &BookingFilter) -> Self {
        let mut query = BookingQuery::new();

        if let Some(user_id) = &filter.user_id {
            query = query.filter(Predicate::Eq(Column::UserId, user_id.clone().into()));
        }
        if let Some(room_id) = &filter.room_id {
            query = query.filter(Predicate::Eq(Column::RoomId, room_id.clone().into()));
        }
        if let Some(cat_id) = &filter.cat_id {
            query = query.filter(Predicate::Eq(Column::CatId, cat_id.clone().into()));
        }
        if !filter.statuses.is_empty() {
            query = query.filter(Predicate::In(
                Column::Status,
                filter.statuses.iter().copied().map(Value::from).collect(),
            ));
        }
        if let Some(period) = &filter.overlapping {
            query = query.overlapping(period);
        }

        let limit = filter.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        query
            .order_by(Column::CreatedAt, Direction::Desc)
            .order_by(Column::Id, Direction::Asc)
            .limit(limit)
    }

    /// Renders `SELECT <booking columns> FROM bookings ...`.
    pub fn to_builder(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        push_where(&mut qb, &self.predicates);

        for (i, (column, direction)) in self.order.iter().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(column.as_sql());
            qb.push(match direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            });
        }

        if let Some(limit) = self.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }

        qb
    }
}

/// Status set that blocks rooms under `policy`.
fn blocking_statuses(policy: HoldPolicy) -> Predicate {
    Predicate::In(
        Column::Status,
        policy
            .blocking_statuses()
            .iter()
            .copied()
            .map(Value::from)
            .collect(),
    )
}

// =============================================================================
// Room Availability
// =============================================================================

/// Rooms flagged available with no blocking booking overlapping `period`.
pub fn available_rooms_query(period: &StayPeriod, policy: HoldPolicy) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT r.id, r.name, r.price_per_day_cents, r.capacity, r.is_available, \
         r.created_at, r.updated_at FROM rooms r \
         WHERE r.is_available = 1 AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.room_id = r.id",
    );

    qb.push(" AND b.check_in_date < ");
    qb.push_bind(period.check_out());
    qb.push(" AND b.check_out_date > ");
    qb.push_bind(period.check_in());
    qb.push(" AND b.status IN (");
    {
        let mut list = qb.separated(", ");
        for status in policy.blocking_statuses() {
            list.push_bind(status.as_str());
        }
    }
    qb.push(")) ORDER BY r.name ASC, r.id ASC");

    qb
}

// =============================================================================
// Rendering
// =============================================================================

fn push_where(qb: &mut QueryBuilder<'static, Sqlite>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });

        match predicate {
            Predicate::Eq(column, value) => push_comparison(qb, *column, " = ", value),
            Predicate::NotEq(column, value) => push_comparison(qb, *column, " <> ", value),
            Predicate::Lt(column, value) => push_comparison(qb, *column, " < ", value),
            Predicate::Gt(column, value) => push_comparison(qb, *column, " > ", value),
            Predicate::In(_, values) if values.is_empty() => {
                qb.push("1 = 0");
            }
            Predicate::In(column, values) => {
                qb.push(column.as_sql());
                qb.push(" IN (");
                let mut list = qb.separated(", ");
                for value in values {
                    match value {
                        Value::Text(s) => list.push_bind(s.clone()),
                        Value::Date(d) => list.push_bind(*d),
                        Value::Status(s) => list.push_bind(s.as_str()),
                    };
                }
                qb.push(")");
            }
        }
    }
}

fn push_comparison(qb: &mut QueryBuilder<'static, Sqlite>, column: Column, op: &str, value: &Value) {
    qb.push(column.as_sql());
    qb.push(op);
    push_value(qb, value);
}

fn push_value(qb: &mut QueryBuilder<'static, Sqlite>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Date(d) => qb.push_bind(*d),
        Value::Status(s) => qb.push_bind(s.as_str()),
    };
}
