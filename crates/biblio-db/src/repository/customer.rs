//! # Customer Repository
//!
//! Customers and their (optional, single) postal address.
//!
//! Deleting a customer removes the address and every loan of the customer
//! through the foreign-key cascades declared in the schema.

use sqlx::SqlitePool;
use tracing::{debug, info};

use biblio_core::validation::{validate_email, validate_name};
use biblio_core::{Address, Customer};

use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, name, email, password_hash, phone, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - The inserted customer
    /// * `Err(DbError::Validation)` - Blank name or malformed email
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(email = %customer.email, "Inserting customer");

        validate_name("name", &customer.name)?;
        validate_email(&customer.email)?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, password_hash, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(customer.name.trim())
        .bind(customer.email.trim())
        .bind(&customer.password_hash)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: customer.email.clone(),
            },
            other => other,
        })?;

        Ok(customer.clone())
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Gets a customer by email (exact match after trimming).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Creates or replaces the address of a customer.
    pub async fn upsert_address(&self, address: &Address) -> DbResult<()> {
        debug!(customer_id = %address.customer_id, "Saving address");

        sqlx::query(
            r#"
            INSERT INTO addresses (customer_id, state, city, district, street, number)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(customer_id) DO UPDATE SET
                state = excluded.state,
                city = excluded.city,
                district = excluded.district,
                street = excluded.street,
                number = excluded.number
            "#,
        )
        .bind(&address.customer_id)
        .bind(&address.state)
        .bind(&address.city)
        .bind(&address.district)
        .bind(&address.street)
        .bind(&address.number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the address of a customer, if one was recorded.
    pub async fn get_address(&self, customer_id: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT customer_id, state, city, district, street, number
            FROM addresses
            WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    /// Deletes a customer together with the address and all loans.
    ///
    /// Stock is not touched: copies still out on active loans stay
    /// unaccounted for, matching a customer who never returns them.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Counts registered customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_customer, seed_customer, test_db};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let customer = seed_customer(&db, "ana@example.com").await;

        let by_id = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ana@example.com");

        let by_email = db
            .customers()
            .get_by_email(" ana@example.com ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, customer.id);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = test_db().await;
        seed_customer(&db, "ana@example.com").await;

        let err = db
            .customers()
            .insert(&new_customer("ana@example.com"))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "ana@example.com"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = test_db().await;
        let result = db.customers().insert(&new_customer("not-an-email")).await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        assert_eq!(db.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_address_upsert_and_cascade() {
        let db = test_db().await;
        let customer = seed_customer(&db, "bia@example.com").await;

        let mut address = Address {
            customer_id: customer.id.clone(),
            state: Some("SP".into()),
            city: Some("Campinas".into()),
            district: None,
            street: Some("Rua A".into()),
            number: Some("10".into()),
        };
        db.customers().upsert_address(&address).await.unwrap();

        address.number = Some("12".into());
        db.customers().upsert_address(&address).await.unwrap();

        let saved = db.customers().get_address(&customer.id).await.unwrap().unwrap();
        assert_eq!(saved.number.as_deref(), Some("12"));

        db.customers().delete(&customer.id).await.unwrap();
        assert!(db.customers().get_address(&customer.id).await.unwrap().is_none());
        assert!(matches!(
            db.customers().delete(&customer.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
