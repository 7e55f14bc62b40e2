//! # Book Repository
//!
//! Database operations for the catalog: books and their reference data
//! (authors, publishers, genres).
//!
//! The loan engine only needs one thing from here: the current price and
//! stock of a book, read on its own transaction through
//! [`pricing_and_stock`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use biblio_core::validation::{validate_name, validate_price_cents};
use biblio_core::{Book, BookStock, ValidationError};

use crate::error::{DbError, DbResult};

const BOOK_COLUMNS: &str = r#"
    id, title, isbn, year, author_id, publisher_id, genre_id,
    country_of_origin, stock, price_cents, manager_id, created_at, updated_at
"#;

/// Price and stock of one book, or `None` if it is not in the catalog.
pub async fn pricing_and_stock(
    conn: &mut SqliteConnection,
    book_id: &str,
) -> DbResult<Option<BookStock>> {
    let row = sqlx::query_as::<_, BookStock>(
        "SELECT id AS book_id, price_cents, stock FROM books WHERE id = ?1",
    )
    .bind(book_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Gets a book by its ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Book>> {
    let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1");
    let book = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.books();
///
/// let book = repo.get_by_id("uuid-here").await?;
/// let total = repo.count().await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Gets a book by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Book))` - Book found
    /// * `Ok(None)` - Book not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let mut conn = self.pool.acquire().await?;
        get_by_id(&mut conn, id).await
    }

    /// Inserts a new book.
    ///
    /// ## Returns
    /// * `Ok(Book)` - The inserted book
    /// * `Err(DbError::Validation)` - Blank title, negative price or stock
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown manager, author, ...
    pub async fn insert(&self, book: &Book) -> DbResult<Book> {
        debug!(title = %book.title, "Inserting book");

        validate_name("title", &book.title)?;
        validate_price_cents(book.price_cents)?;
        if book.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, isbn, year, author_id, publisher_id, genre_id,
                country_of_origin, stock, price_cents, manager_id,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13
            )
            "#,
        )
        .bind(&book.id)
        .bind(book.title.trim())
        .bind(&book.isbn)
        .bind(book.year)
        .bind(&book.author_id)
        .bind(&book.publisher_id)
        .bind(&book.genre_id)
        .bind(&book.country_of_origin)
        .bind(book.stock)
        .bind(book.price_cents)
        .bind(&book.manager_id)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(book.clone())
    }

    /// Changes the current price of a book.
    ///
    /// Loans already created keep the price they were created with.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        debug!(id = %id, price_cents = price_cents, "Updating book price");
        validate_price_cents(price_cents)?;

        let result = sqlx::query("UPDATE books SET price_cents = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(price_cents)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Registers an author and returns its ID.
    pub async fn insert_author(&self, name: &str) -> DbResult<String> {
        self.insert_named("authors", "author", name).await
    }

    /// Registers a publisher and returns its ID.
    pub async fn insert_publisher(&self, name: &str) -> DbResult<String> {
        self.insert_named("publishers", "publisher", name).await
    }

    /// Registers a genre and returns its ID.
    pub async fn insert_genre(&self, name: &str) -> DbResult<String> {
        self.insert_named("genres", "genre", name).await
    }

    async fn insert_named(&self, table: &'static str, field: &str, name: &str) -> DbResult<String> {
        validate_name(field, name)?;

        let id = generate_book_id();
        let sql = format!("INSERT INTO {table} (id, name) VALUES (?1, ?2)");
        sqlx::query(&sql)
            .bind(&id)
            .bind(name.trim())
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    /// Counts books in the catalog (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new catalog ID.
pub fn generate_book_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_book, seed_book, seed_manager, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let book = seed_book(&db, "Memórias Póstumas", 2590, 4).await;

        let found = db.books().get_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Memórias Póstumas");
        assert_eq!(found.price_cents, 2590);
        assert_eq!(found.stock, 4);
        assert_eq!(db.books().count().await.unwrap(), 1);

        assert!(db.books().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pricing_and_stock() {
        let db = test_db().await;
        let book = seed_book(&db, "Vidas Secas", 1500, 2).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let view = pricing_and_stock(&mut conn, &book.id).await.unwrap().unwrap();
        assert_eq!(view, book.stock_view());
        assert!(pricing_and_stock(&mut conn, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_negative_price_and_blank_title() {
        let db = test_db().await;
        let manager = seed_manager(&db, "staff@biblio.local").await;

        let mut book = new_book(&manager.id, "Quincas Borba", -1, 1);
        assert!(matches!(
            db.books().insert(&book).await,
            Err(DbError::Validation(_))
        ));

        book.price_cents = 100;
        book.title = "   ".to_string();
        assert!(matches!(
            db.books().insert(&book).await,
            Err(DbError::Validation(_))
        ));
        assert_eq!(db.books().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_manager_rejected() {
        let db = test_db().await;
        let book = new_book("no-such-manager", "Senhora", 100, 1);

        assert!(matches!(
            db.books().insert(&book).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_reference_data_and_price_update() {
        let db = test_db().await;
        let author = db.books().insert_author("Machado de Assis").await.unwrap();
        db.books().insert_publisher("Garnier").await.unwrap();
        db.books().insert_genre("Romance").await.unwrap();
        assert!(db.books().insert_genre("").await.is_err());

        let manager = seed_manager(&db, "staff@biblio.local").await;
        let mut book = new_book(&manager.id, "Helena", 1200, 3);
        book.author_id = Some(author);
        db.books().insert(&book).await.unwrap();

        db.books().update_price(&book.id, 1800).await.unwrap();
        let found = db.books().get_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(found.price_cents, 1800);

        assert!(matches!(
            db.books().update_price("missing", 10).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
