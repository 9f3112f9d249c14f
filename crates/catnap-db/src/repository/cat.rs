//! # Cat Repository
//!
//! Registered cats and their owners.

use catnap_core::validation::validate_name;
use catnap_core::{Actor, Cat, CoreError};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const CAT_COLUMNS: &str = "id, owner_id, name, is_active, created_at";

/// Repository for cat database operations.
#[derive(Debug, Clone)]
pub struct CatRepository {
    pool: SqlitePool,
}

impl CatRepository {
    /// Creates a new CatRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatRepository { pool }
    }

    /// Gets a cat by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Cat>> {
        let mut conn = self.pool.acquire().await?;
        fetch_cat(&mut conn, id).await
    }

    /// Cats owned by `owner_id`, active ones first.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Cat>> {
        let cats = sqlx::query_as::<_, Cat>(&format!(
            "SELECT {CAT_COLUMNS} FROM cats WHERE owner_id = ?1 ORDER BY is_active DESC, name ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(cats)
    }

    /// Registers a cat.
    ///
    /// Customers register their own cats; admins may register for anyone.
    pub async fn register(&self, actor: &Actor, owner_id: &str, name: &str) -> DbResult<Cat> {
        if !actor.can_act_for(owner_id) {
            return Err(CoreError::forbidden("cannot register a cat for another customer").into());
        }
        let name = validate_name("name", name)?;

        let cat = Cat {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %cat.id, owner_id = %cat.owner_id, "Registering cat");

        sqlx::query(
            "INSERT INTO cats (id, owner_id, name, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&cat.id)
        .bind(&cat.owner_id)
        .bind(&cat.name)
        .bind(cat.is_active)
        .bind(cat.created_at)
        .execute(&self.pool)
        .await?;

        Ok(cat)
    }

    /// Archives or restores a cat. Owner or admin.
    ///
    /// Archived cats keep their bookings but cannot be booked again.
    pub async fn set_active(&self, actor: &Actor, id: &str, active: bool) -> DbResult<()> {
        let cat = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Cat", id))?;

        if !actor.can_act_for(&cat.owner_id) {
            return Err(CoreError::forbidden("cat belongs to another customer").into());
        }

        sqlx::query("UPDATE cats SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        info!(cat_id = %id, active, "Cat status changed");
        Ok(())
    }
}

pub(crate) async fn fetch_cat(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Cat>> {
    let cat = sqlx::query_as::<_, Cat>(&format!("SELECT {CAT_COLUMNS} FROM cats WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(cat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use catnap_core::ErrorKind;

    #[tokio::test]
    async fn test_register_and_archive() {
        let cats = Database::new(DbConfig::in_memory()).await.unwrap().cats();
        let owner = Actor::customer("u-1");

        let cat = cats.register(&owner, "u-1", "Miso").await.unwrap();
        cats.set_active(&owner, &cat.id, false).await.unwrap();

        let loaded = cats.get(&cat.id).await.unwrap().unwrap();
        assert!(!loaded.is_active);
        assert_eq!(cats.list_for_owner("u-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cannot_register_for_someone_else() {
        let cats = Database::new(DbConfig::in_memory()).await.unwrap().cats();
        let err = cats
            .register(&Actor::customer("u-2"), "u-1", "Miso")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert!(cats.register(&Actor::admin("staff"), "u-1", "Miso").await.is_ok());
    }
}
