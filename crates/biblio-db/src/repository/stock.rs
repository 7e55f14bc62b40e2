//! # Stock Ledger
//!
//! The authoritative count of copies on the shelf per book.
//!
//! ## Delta Updates With a Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, subtract in Rust, write back                      │
//! │     UPDATE books SET stock = 3 WHERE id = ?                        │
//! │                                                                     │
//! │  ✅ CORRECT: guarded delta                                         │
//! │     UPDATE books SET stock = stock - 2                             │
//! │     WHERE id = ? AND stock >= 2                                    │
//! │                                                                     │
//! │  Two loans racing for the last copy: one UPDATE matches,           │
//! │  the other matches zero rows and becomes a StockConflict.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The free functions take a `&mut SqliteConnection` so the loan engine can
//! run them on its open transaction. [`StockLedger`] wraps them for callers
//! holding only the pool.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use biblio_core::ValidationError;

use crate::error::{DbError, DbResult};

/// Copies currently available, or `None` if the book does not exist.
pub async fn available(conn: &mut SqliteConnection, book_id: &str) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM books WHERE id = ?1")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(stock)
}

/// Takes `n` copies off the shelf. Returns the remaining stock.
///
/// ## Errors
/// * `DbError::StockConflict` - fewer than `n` copies available
/// * `DbError::NotFound` - no such book
pub async fn decrement(conn: &mut SqliteConnection, book_id: &str, n: i64) -> DbResult<i64> {
    ensure_positive(n)?;
    debug!(book_id = %book_id, n = n, "Decrementing stock");

    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE books
        SET
            stock = stock - ?2,
            updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        RETURNING stock
        "#,
    )
    .bind(book_id)
    .bind(n)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    match remaining {
        Some(stock) => Ok(stock),
        None => match available(conn, book_id).await? {
            Some(available) => Err(DbError::StockConflict {
                book_id: book_id.to_string(),
                available,
                requested: n,
            }),
            None => Err(DbError::not_found("Book", book_id)),
        },
    }
}

/// Puts `n` copies back on the shelf. Returns the new stock.
pub async fn increment(conn: &mut SqliteConnection, book_id: &str, n: i64) -> DbResult<i64> {
    ensure_positive(n)?;
    debug!(book_id = %book_id, n = n, "Incrementing stock");

    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE books
        SET
            stock = stock + ?2,
            updated_at = ?3
        WHERE id = ?1
        RETURNING stock
        "#,
    )
    .bind(book_id)
    .bind(n)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    stock.ok_or_else(|| DbError::not_found("Book", book_id))
}

fn ensure_positive(n: i64) -> DbResult<()> {
    if n < 1 {
        return Err(ValidationError::OutOfRange {
            field: "stock adjustment".to_string(),
            min: 1,
            max: i64::MAX,
        }
        .into());
    }
    Ok(())
}

/// Pool-backed access to the stock ledger.
///
/// Each call runs on its own connection and commits immediately.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Copies currently available, or `None` if the book does not exist.
    pub async fn available(&self, book_id: &str) -> DbResult<Option<i64>> {
        let mut conn = self.pool.acquire().await?;
        available(&mut conn, book_id).await
    }

    /// See [`decrement`].
    pub async fn decrement(&self, book_id: &str, n: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        decrement(&mut conn, book_id, n).await
    }

    /// See [`increment`].
    pub async fn increment(&self, book_id: &str, n: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        increment(&mut conn, book_id, n).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_book, test_db};
    use super::ensure_positive;
    use crate::DbError;
    use biblio_core::{LoanError, ValidationError};

    #[tokio::test]
    async fn test_decrement_and_increment() {
        let db = test_db().await;
        let book = seed_book(&db, "Dom Casmurro", 1000, 5).await;

        assert_eq!(db.stock().decrement(&book.id, 2).await.unwrap(), 3);
        assert_eq!(db.stock().increment(&book.id, 2).await.unwrap(), 5);
        assert_eq!(db.stock().available(&book.id).await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let db = test_db().await;
        let book = seed_book(&db, "Iracema", 500, 1).await;

        let err = db.stock().decrement(&book.id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            crate::DbError::StockConflict { available: 1, requested: 2, .. }
        ));
        assert_eq!(db.stock().available(&book.id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_missing_book() {
        let db = test_db().await;

        assert_eq!(db.stock().available("missing").await.unwrap(), None);
        assert!(matches!(
            db.stock().decrement("missing", 1).await,
            Err(crate::DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.stock().increment("missing", 1).await,
            Err(crate::DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_adjustment_rejected() {
        let db = test_db().await;
        let book = seed_book(&db, "O Cortiço", 800, 3).await;

        assert!(matches!(
            db.stock().decrement(&book.id, 0).await,
            Err(DbError::Validation(ValidationError::OutOfRange { min: 1, .. }))
        ));
        assert!(matches!(
            db.stock().increment(&book.id, -1).await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(db.stock().available(&book.id).await.unwrap(), Some(3));

        let err: LoanError = ensure_positive(0).unwrap_err().into();
        assert!(matches!(err, LoanError::Validation(_)));
    }
}
