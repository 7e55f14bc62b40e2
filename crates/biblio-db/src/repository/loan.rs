//! # Loan Repository
//!
//! Database operations for loan headers and their lines.
//!
//! ## Loan Lifecycle in SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_loan (one transaction)                                         │
//! │  ├── insert_loan      INSERT INTO loans (..., status='active')         │
//! │  └── insert_line × N  INSERT INTO loan_lines (snapshot prices)         │
//! │                                                                         │
//! │  return_loan (one transaction)                                         │
//! │  └── finalize         UPDATE loans SET status='finalized'              │
//! │                       WHERE id=? AND customer_id=? AND status='active' │
//! │                                                                         │
//! │  The status guard makes the transition happen at most once: a second  │
//! │  return matches zero rows and never restocks anything.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loans are never deleted on their own; they go away with their customer
//! (`ON DELETE CASCADE`).

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use biblio_core::{Loan, LoanLine, LoanStatus};

use crate::error::DbResult;

const LOAN_COLUMNS: &str =
    "id, customer_id, started_at, due_at, status, total_cents, returned_at";

const LINE_COLUMNS: &str =
    "id, loan_id, book_id, position, quantity, unit_price_cents, line_price_cents";

/// Inserts a loan header.
pub async fn insert_loan(conn: &mut SqliteConnection, loan: &Loan) -> DbResult<()> {
    debug!(loan_id = %loan.id, customer_id = %loan.customer_id, "Inserting loan");

    sqlx::query(
        r#"
        INSERT INTO loans (
            id, customer_id, started_at, due_at, status, total_cents, returned_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7
        )
        "#,
    )
    .bind(&loan.id)
    .bind(&loan.customer_id)
    .bind(loan.started_at)
    .bind(loan.due_at)
    .bind(loan.status)
    .bind(loan.total_cents)
    .bind(loan.returned_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts a loan line.
pub async fn insert_line(conn: &mut SqliteConnection, line: &LoanLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO loan_lines (
            id, loan_id, book_id, position, quantity,
            unit_price_cents, line_price_cents
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7
        )
        "#,
    )
    .bind(&line.id)
    .bind(&line.loan_id)
    .bind(&line.book_id)
    .bind(line.position)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.line_price_cents)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a loan header by its ID.
pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Loan>> {
    let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1");
    let loan = sqlx::query_as::<_, Loan>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(loan)
}

/// Lines of a loan in cart order.
pub async fn lines_for_loan(conn: &mut SqliteConnection, loan_id: &str) -> DbResult<Vec<LoanLine>> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM loan_lines WHERE loan_id = ?1 ORDER BY position");
    let lines = sqlx::query_as::<_, LoanLine>(&sql)
        .bind(loan_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(lines)
}

/// Active loans of a customer.
pub async fn active_for_customer(
    conn: &mut SqliteConnection,
    customer_id: &str,
) -> DbResult<Vec<Loan>> {
    let sql = format!(
        "SELECT {LOAN_COLUMNS} FROM loans WHERE customer_id = ?1 AND status = ?2 ORDER BY due_at"
    );
    let loans = sqlx::query_as::<_, Loan>(&sql)
        .bind(customer_id)
        .bind(LoanStatus::Active)
        .fetch_all(&mut *conn)
        .await?;

    Ok(loans)
}

/// All loans of a customer, newest first.
pub async fn list_for_customer(
    conn: &mut SqliteConnection,
    customer_id: &str,
) -> DbResult<Vec<Loan>> {
    let sql = format!(
        "SELECT {LOAN_COLUMNS} FROM loans WHERE customer_id = ?1 \
         ORDER BY started_at DESC, rowid DESC"
    );
    let loans = sqlx::query_as::<_, Loan>(&sql)
        .bind(customer_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(loans)
}

/// Moves an active loan owned by `customer_id` to `finalized`.
///
/// Returns `false` when nothing matched: the loan is missing, belongs to
/// someone else, or was already finalized.
pub async fn finalize(
    conn: &mut SqliteConnection,
    loan_id: &str,
    customer_id: &str,
    returned_at: DateTime<Utc>,
) -> DbResult<bool> {
    debug!(loan_id = %loan_id, "Finalizing loan");

    let result = sqlx::query(
        r#"
        UPDATE loans
        SET
            status = ?4,
            returned_at = ?3
        WHERE id = ?1 AND customer_id = ?2 AND status = ?5
        "#,
    )
    .bind(loan_id)
    .bind(customer_id)
    .bind(returned_at)
    .bind(LoanStatus::Finalized)
    .bind(LoanStatus::Active)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Repository for loan reads outside the engine's transactions.
///
/// ## Usage
/// ```rust,ignore
/// let loans = db.loans().list_for_customer(&customer_id).await?;
/// let lines = db.loans().lines_for_loan(&loans[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Gets a loan header by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Loan>> {
        let mut conn = self.pool.acquire().await?;
        get_by_id(&mut conn, id).await
    }

    /// Lines of a loan in cart order.
    pub async fn lines_for_loan(&self, loan_id: &str) -> DbResult<Vec<LoanLine>> {
        let mut conn = self.pool.acquire().await?;
        lines_for_loan(&mut conn, loan_id).await
    }

    /// All loans of a customer, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Loan>> {
        let mut conn = self.pool.acquire().await?;
        list_for_customer(&mut conn, customer_id).await
    }

    /// Active loans of a customer, earliest due first.
    pub async fn active_for_customer(&self, customer_id: &str) -> DbResult<Vec<Loan>> {
        let mut conn = self.pool.acquire().await?;
        active_for_customer(&mut conn, customer_id).await
    }

    /// Counts active loans across all customers (for diagnostics).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = ?1")
            .bind(LoanStatus::Active)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all loans (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
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
    use crate::test_support::{seed_book, seed_customer, test_db};
    use chrono::Duration;

    fn loan(id: &str, customer_id: &str, started_at: DateTime<Utc>) -> Loan {
        Loan {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            started_at,
            due_at: started_at + Duration::days(14),
            status: LoanStatus::Active,
            total_cents: 1000,
            returned_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = test_db().await;
        let customer = seed_customer(&db, "ana@example.com").await;
        let book = seed_book(&db, "Macunaíma", 1000, 3).await;
        let now = Utc::now();

        let mut conn = db.pool().acquire().await.unwrap();
        let header = loan("loan-1", &customer.id, now);
        insert_loan(&mut conn, &header).await.unwrap();
        insert_line(
            &mut conn,
            &LoanLine {
                id: "line-1".into(),
                loan_id: "loan-1".into(),
                book_id: book.id.clone(),
                position: 0,
                quantity: 1,
                unit_price_cents: 1000,
                line_price_cents: 1000,
            },
        )
        .await
        .unwrap();
        drop(conn);

        let found = db.loans().get_by_id("loan-1").await.unwrap().unwrap();
        assert_eq!(found.status, LoanStatus::Active);
        assert_eq!(found.total_cents, 1000);
        assert_eq!(found.due_at, header.due_at);

        let lines = db.loans().lines_for_loan("loan-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].book_id, book.id);
    }

    #[tokio::test]
    async fn test_finalize_only_once() {
        let db = test_db().await;
        let customer = seed_customer(&db, "bia@example.com").await;

        let mut conn = db.pool().acquire().await.unwrap();
        insert_loan(&mut conn, &loan("loan-1", &customer.id, Utc::now()))
            .await
            .unwrap();

        assert!(!finalize(&mut conn, "loan-1", "someone-else", Utc::now()).await.unwrap());
        assert!(finalize(&mut conn, "loan-1", &customer.id, Utc::now()).await.unwrap());
        assert!(!finalize(&mut conn, "loan-1", &customer.id, Utc::now()).await.unwrap());
        assert!(!finalize(&mut conn, "missing", &customer.id, Utc::now()).await.unwrap());

        let found = get_by_id(&mut conn, "loan-1").await.unwrap().unwrap();
        assert_eq!(found.status, LoanStatus::Finalized);
        assert!(found.returned_at.is_some());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_active_filter() {
        let db = test_db().await;
        let customer = seed_customer(&db, "caio@example.com").await;
        let now = Utc::now();

        let mut conn = db.pool().acquire().await.unwrap();
        insert_loan(&mut conn, &loan("old", &customer.id, now - Duration::days(10)))
            .await
            .unwrap();
        insert_loan(&mut conn, &loan("new", &customer.id, now)).await.unwrap();
        finalize(&mut conn, "old", &customer.id, now).await.unwrap();
        drop(conn);

        let all = db.loans().list_for_customer(&customer.id).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let active = db.loans().active_for_customer(&customer.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "new");
        assert_eq!(db.loans().count_active().await.unwrap(), 1);
        assert_eq!(db.loans().count().await.unwrap(), 2);
    }
}
