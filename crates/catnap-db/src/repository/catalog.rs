//! # Catalog Repository
//!
//! Rooms, services and food items.
//!
//! ## Access Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Admin writes (pool)             Engine reads (inside a unit of work)   │
//! │  ─────────────────────           ──────────────────────────────────     │
//! │  insert_room                     lock_room      ← write lock first      │
//! │  set_room_available              fetch_room                             │
//! │  set_service_price               fetch_service  ─┐                      │
//! │  set_food_active ...             fetch_food     ─┴─► CatalogSnapshot    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Admin writes never run inside a booking unit of work. A price change
//! committed after a booking was created does not touch that booking's
//! captured line prices.

use catnap_core::validation::{validate_capacity, validate_name, validate_price_cents};
use catnap_core::{
    Actor, CatalogEntry, CatalogSnapshot, CoreError, FoodItem, HoldPolicy, Money, Room, Service,
    StayPeriod,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::query::available_rooms_query;

const ROOM_COLUMNS: &str =
    "id, name, price_per_day_cents, capacity, is_available, created_at, updated_at";

/// Which priced catalog table a lookup targets.
#[derive(Debug, Clone, Copy)]
enum PricedTable {
    Services,
    FoodItems,
}

impl PricedTable {
    const fn name(&self) -> &'static str {
        match self {
            PricedTable::Services => "services",
            PricedTable::FoodItems => "food_items",
        }
    }
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    /// Gets a room by ID.
    pub async fn get_room(&self, id: &str) -> DbResult<Option<Room>> {
        let mut conn = self.pool.acquire().await?;
        fetch_room(&mut conn, id).await
    }

    /// Lists all rooms, available or not, by name.
    pub async fn list_rooms(&self) -> DbResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    /// Counts rooms (used by the seed binary).
    pub async fn count_rooms(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a new room, flagged available.
    pub async fn insert_room(
        &self,
        actor: &Actor,
        name: &str,
        price_per_day: Money,
        capacity: i64,
    ) -> DbResult<Room> {
        require_admin(actor)?;
        let name = validate_name("name", name)?;
        validate_price_cents(price_per_day.cents())?;
        validate_capacity(capacity)?;

        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4().to_string(),
            name,
            price_per_day_cents: price_per_day.cents(),
            capacity,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %room.id, name = %room.name, "Inserting room");

        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, price_per_day_cents, capacity, is_available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&room.id)
        .bind(&room.name)
        .bind(room.price_per_day_cents)
        .bind(room.capacity)
        .bind(room.is_available)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    /// Takes a room off the market or puts it back.
    ///
    /// Existing bookings are untouched; only new bookings see the flag.
    pub async fn set_room_available(&self, actor: &Actor, id: &str, available: bool) -> DbResult<()> {
        require_admin(actor)?;

        let result = sqlx::query("UPDATE rooms SET is_available = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(available)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }

        info!(room_id = %id, available, "Room availability changed");
        Ok(())
    }

    /// Changes a room's nightly rate. Affects future bookings only.
    pub async fn set_room_price(&self, actor: &Actor, id: &str, price_per_day: Money) -> DbResult<()> {
        require_admin(actor)?;
        validate_price_cents(price_per_day.cents())?;

        let result =
            sqlx::query("UPDATE rooms SET price_per_day_cents = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(price_per_day.cents())
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Room", id));
        }
        Ok(())
    }

    /// Rooms flagged available with no blocking booking overlapping `period`.
    pub async fn available_rooms(&self, period: &StayPeriod, policy: HoldPolicy) -> DbResult<Vec<Room>> {
        let mut qb = available_rooms_query(period, policy);
        let rooms = qb.build_query_as::<Room>().fetch_all(&self.pool).await?;

        debug!(
            check_in = %period.check_in(),
            check_out = %period.check_out(),
            count = rooms.len(),
            "Available rooms"
        );
        Ok(rooms)
    }

    // =========================================================================
    // Services & Food
    // =========================================================================

    /// Gets a service by ID.
    pub async fn get_service(&self, id: &str) -> DbResult<Option<Service>> {
        let mut conn = self.pool.acquire().await?;
        fetch_service(&mut conn, id).await
    }

    /// Gets a food item by ID.
    pub async fn get_food(&self, id: &str) -> DbResult<Option<FoodItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_food(&mut conn, id).await
    }

    /// Lists active services by name.
    pub async fn list_services(&self) -> DbResult<Vec<Service>> {
        let rows = sqlx::query_as::<_, Service>(
            "SELECT id, name, price_cents, is_active, updated_at FROM services \
             WHERE is_active = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lists active food items by name.
    pub async fn list_food(&self) -> DbResult<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(
            "SELECT id, name, price_cents, is_active, updated_at FROM food_items \
             WHERE is_active = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Inserts a new active service.
    pub async fn insert_service(&self, actor: &Actor, name: &str, price: Money) -> DbResult<Service> {
        let (id, name, updated_at) = self.insert_priced(actor, PricedTable::Services, name, price).await?;
        Ok(Service {
            id,
            name,
            price_cents: price.cents(),
            is_active: true,
            updated_at,
        })
    }

    /// Inserts a new active food item.
    pub async fn insert_food(&self, actor: &Actor, name: &str, price: Money) -> DbResult<FoodItem> {
        let (id, name, updated_at) = self.insert_priced(actor, PricedTable::FoodItems, name, price).await?;
        Ok(FoodItem {
            id,
            name,
            price_cents: price.cents(),
            is_active: true,
            updated_at,
        })
    }

    /// Changes a service's price. Captured booking lines keep theirs.
    pub async fn set_service_price(&self, actor: &Actor, id: &str, price: Money) -> DbResult<()> {
        self.update_priced(actor, PricedTable::Services, id, "price_cents", price.cents())
            .await
    }

    /// Changes a food item's price. Captured booking lines keep theirs.
    pub async fn set_food_price(&self, actor: &Actor, id: &str, price: Money) -> DbResult<()> {
        self.update_priced(actor, PricedTable::FoodItems, id, "price_cents", price.cents())
            .await
    }

    /// Withdraws or restores a service.
    pub async fn set_service_active(&self, actor: &Actor, id: &str, active: bool) -> DbResult<()> {
        self.update_priced(actor, PricedTable::Services, id, "is_active", active as i64)
            .await
    }

    /// Withdraws or restores a food item.
    pub async fn set_food_active(&self, actor: &Actor, id: &str, active: bool) -> DbResult<()> {
        self.update_priced(actor, PricedTable::FoodItems, id, "is_active", active as i64)
            .await
    }

    async fn insert_priced(
        &self,
        actor: &Actor,
        table: PricedTable,
        name: &str,
        price: Money,
    ) -> DbResult<(String, String, chrono::DateTime<Utc>)> {
        require_admin(actor)?;
        let name = validate_name("name", name)?;
        validate_price_cents(price.cents())?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(table = table.name(), id = %id, name = %name, "Inserting catalog item");

        sqlx::query(&format!(
            "INSERT INTO {} (id, name, price_cents, is_active, updated_at) VALUES (?1, ?2, ?3, 1, ?4)",
            table.name()
        ))
        .bind(&id)
        .bind(&name)
        .bind(price.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok((id, name, now))
    }

    async fn update_priced(
        &self,
        actor: &Actor,
        table: PricedTable,
        id: &str,
        column: &'static str,
        value: i64,
    ) -> DbResult<()> {
        require_admin(actor)?;
        if column == "price_cents" {
            validate_price_cents(value)?;
        }

        let result = sqlx::query(&format!(
            "UPDATE {} SET {column} = ?2, updated_at = ?3 WHERE id = ?1",
            table.name()
        ))
        .bind(id)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let entity = match table {
                PricedTable::Services => "Service",
                PricedTable::FoodItems => "Food item",
            };
            return Err(DbError::not_found(entity, id));
        }

        info!(table = table.name(), id = %id, column, value, "Catalog item updated");
        Ok(())
    }
}

fn require_admin(actor: &Actor) -> DbResult<()> {
    if !actor.is_admin() {
        return Err(CoreError::forbidden("catalog changes require an admin").into());
    }
    Ok(())
}

// =============================================================================
// Unit-of-Work Operations
// =============================================================================

/// Takes the database write lock on behalf of `room_id`.
///
/// This is the first statement of every booking unit of work. SQLite has a
/// single writer, so the no-op update makes every other writer wait here
/// (up to the busy timeout) until this unit of work commits or rolls back.
/// Returns `false` when the room does not exist.
pub(crate) async fn lock_room(conn: &mut SqliteConnection, room_id: &str) -> DbResult<bool> {
    let result = sqlx::query("UPDATE rooms SET updated_at = updated_at WHERE id = ?1")
        .bind(room_id)
        .execute(&mut *conn)
        .await?;

    debug!(room_id = %room_id, "Room write lock acquired");
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn fetch_room(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Room>> {
    let room = sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(room)
}

pub(crate) async fn fetch_service(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Service>> {
    let row = sqlx::query_as::<_, Service>(
        "SELECT id, name, price_cents, is_active, updated_at FROM services WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub(crate) async fn fetch_food(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<FoodItem>> {
    let row = sqlx::query_as::<_, FoodItem>(
        "SELECT id, name, price_cents, is_active, updated_at FROM food_items WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Reads the current price of every referenced service and food item.
///
/// Missing ids are left out; the price calculator reports them.
pub(crate) async fn load_snapshot(
    conn: &mut SqliteConnection,
    service_ids: &[&str],
    food_ids: &[&str],
) -> DbResult<CatalogSnapshot> {
    let mut snapshot = CatalogSnapshot::new();

    for &id in service_ids {
        if let Some(service) = fetch_service(conn, id).await? {
            snapshot.insert_service(CatalogEntry::from(&service));
        }
    }
    for &id in food_ids {
        if let Some(food) = fetch_food(conn, id).await? {
            snapshot.insert_food(CatalogEntry::from(&food));
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use catnap_core::ErrorKind;

    async fn setup() -> CatalogRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().catalog()
    }

    #[tokio::test]
    async fn test_room_round_trip_and_flag() {
        let catalog = setup().await;
        let admin = Actor::admin("staff");

        let room = catalog
            .insert_room(&admin, "Sunny Loft", Money::from_cents(2000), 2)
            .await
            .unwrap();
        let loaded = catalog.get_room(&room.id).await.unwrap().unwrap();
        assert_eq!(loaded.price_per_day_cents, 2000);
        assert!(loaded.is_available);

        catalog.set_room_available(&admin, &room.id, false).await.unwrap();
        assert!(!catalog.get_room(&room.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_customer_cannot_edit_catalog() {
        let catalog = setup().await;
        let err = catalog
            .insert_service(&Actor::customer("u-1"), "Grooming", Money::from_cents(1000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_service_price_and_active_updates() {
        let catalog = setup().await;
        let admin = Actor::admin("staff");

        let service = catalog
            .insert_service(&admin, "Grooming", Money::from_cents(1000))
            .await
            .unwrap();
        catalog
            .set_service_price(&admin, &service.id, Money::from_cents(1500))
            .await
            .unwrap();
        catalog.set_service_active(&admin, &service.id, false).await.unwrap();

        let loaded = catalog.get_service(&service.id).await.unwrap().unwrap();
        assert_eq!(loaded.price_cents, 1500);
        assert!(!loaded.is_active);
        assert!(catalog.list_services().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_food_update_is_not_found() {
        let catalog = setup().await;
        let err = catalog
            .set_food_active(&Actor::admin("staff"), "nope", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
