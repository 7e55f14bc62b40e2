//! # Manager Repository
//!
//! Library staff. One of them is the administrator: the manager whose email
//! matches the configured administrator email.

use sqlx::SqlitePool;
use tracing::debug;

use biblio_core::validation::{validate_email, validate_name};
use biblio_core::Manager;

use crate::error::DbResult;

const MANAGER_COLUMNS: &str = "id, code, name, phone, email, password_hash";

/// Repository for manager database operations.
#[derive(Debug, Clone)]
pub struct ManagerRepository {
    pool: SqlitePool,
}

impl ManagerRepository {
    /// Creates a new ManagerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ManagerRepository { pool }
    }

    /// Inserts a new manager.
    pub async fn insert(&self, manager: &Manager) -> DbResult<Manager> {
        debug!(email = %manager.email, "Inserting manager");

        validate_name("name", &manager.name)?;
        validate_email(&manager.email)?;

        sqlx::query(
            r#"
            INSERT INTO managers (id, code, name, phone, email, password_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&manager.id)
        .bind(manager.code)
        .bind(manager.name.trim())
        .bind(&manager.phone)
        .bind(manager.email.trim())
        .bind(&manager.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(manager.clone())
    }

    /// Gets a manager by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Manager>> {
        let sql = format!("SELECT {MANAGER_COLUMNS} FROM managers WHERE id = ?1");
        let manager = sqlx::query_as::<_, Manager>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(manager)
    }

    /// Gets a manager by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Manager>> {
        let sql = format!(
            "SELECT {MANAGER_COLUMNS} FROM managers WHERE lower(email) = lower(?1)"
        );
        let manager = sqlx::query_as::<_, Manager>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(manager)
    }

    /// The administrator, if one is registered under `admin_email`.
    pub async fn administrator(&self, admin_email: &str) -> DbResult<Option<Manager>> {
        let manager = self.get_by_email(admin_email).await?;
        Ok(manager.filter(|m| m.is_administrator(admin_email)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_manager, test_db};

    #[tokio::test]
    async fn test_administrator_lookup() {
        let db = test_db().await;
        let admin = seed_manager(&db, "Admin@Biblio.local").await;
        seed_manager(&db, "staff@biblio.local").await;

        let found = db
            .managers()
            .administrator("admin@biblio.local")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, admin.id);

        assert!(db
            .managers()
            .administrator("nobody@biblio.local")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = test_db().await;
        let manager = seed_manager(&db, "staff@biblio.local").await;

        let found = db.managers().get_by_id(&manager.id).await.unwrap().unwrap();
        assert_eq!(found.email, "staff@biblio.local");
        assert!(db.managers().get_by_id("missing").await.unwrap().is_none());
    }
}
