//! # Loan Lifecycle Engine
//!
//! Creates and returns loans. Every mutation runs inside a single SQLite
//! transaction; dropping the transaction on an early `?` rolls everything
//! back, so a failed call leaves stock and loans exactly as they were.
//!
//! ## Create Loan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_loan(customer, LoanRequest)                                     │
//! │       │                                                                 │
//! │       ▼  biblio-core, no I/O                                            │
//! │  normalized() ── EmptyCart / InvalidQuantity / Validation              │
//! │       │                                                                 │
//! │       ▼  BEGIN IMMEDIATE                                                │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │ 1. pricing_and_stock per book       ── BookNotFound           │     │
//! │  │ 2. LoanPlan::price (stock ≥ qty)    ── InsufficientStock      │     │
//! │  │ 3. active loans → FinePolicy gate   ── OutstandingFine        │     │
//! │  │ 4. INSERT loan + lines (price snapshot)                       │     │
//! │  │ 5. guarded stock decrement per line ── InsufficientStock      │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │       │  COMMIT                                                         │
//! │       ▼                                                                 │
//! │  LoanReceipt                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Return Loan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                        │
//! │  UPDATE loans SET status='finalized' WHERE ... AND status='active'     │
//! │       │                                                                 │
//! │       ├── 0 rows ─► lookup ─► LoanNotFound | AlreadyFinalized          │
//! │       │                                                                 │
//! │       ▼ 1 row                                                           │
//! │  stock += quantity for every line                                      │
//! │  COMMIT ─► ReturnReceipt                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never touches the pool while a transaction is open: all reads
//! and writes of one call go through the same connection.
//!
//! Transactions open with `BEGIN IMMEDIATE` so the write lock is taken up
//! front. Concurrent writers wait on the busy timeout instead of failing a
//! read-to-write lock upgrade halfway through.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use biblio_core::{
    LoanDetails, LoanError, LoanPlan, LoanPolicy, LoanReceipt, LoanRequest, LoanResult,
    LoanStatus, Money, ReturnReceipt,
};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::{book, loan, stock};

/// Orchestrates loan creation, loan return and fine queries.
///
/// Stateless apart from its configuration; clone it freely.
#[derive(Debug, Clone)]
pub struct LoanEngine {
    db: Database,
    policy: LoanPolicy,
}

impl LoanEngine {
    pub fn new(db: Database, policy: LoanPolicy) -> Self {
        LoanEngine { db, policy }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a loan starting now.
    ///
    /// `customer_id` comes from the authentication layer and is trusted.
    pub async fn create_loan(
        &self,
        customer_id: &str,
        request: &LoanRequest,
    ) -> LoanResult<LoanReceipt> {
        self.create_loan_at(customer_id, request, Utc::now()).await
    }

    /// Creates a loan starting at `now`.
    pub async fn create_loan_at(
        &self,
        customer_id: &str,
        request: &LoanRequest,
        now: DateTime<Utc>,
    ) -> LoanResult<LoanReceipt> {
        let result = self.try_create(customer_id, request, now).await;

        match &result {
            Ok(receipt) => info!(
                loan_id = %receipt.loan_id,
                customer_id = %customer_id,
                lines = receipt.lines.len(),
                total = %receipt.total(),
                due_at = %receipt.due_at,
                "Loan created"
            ),
            Err(err) => warn!(customer_id = %customer_id, error = %err, "Loan request rejected"),
        }

        result
    }

    async fn try_create(
        &self,
        customer_id: &str,
        request: &LoanRequest,
        now: DateTime<Utc>,
    ) -> LoanResult<LoanReceipt> {
        let request = request.normalized(self.policy.max_duration_days)?;

        let mut tx = self
            .db
            .pool()
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        let book_ids = request.book_ids();
        let mut snapshot = Vec::with_capacity(book_ids.len());
        for book_id in book_ids {
            match book::pricing_and_stock(&mut tx, book_id).await? {
                Some(row) => snapshot.push(row),
                None => return Err(LoanError::BookNotFound(book_id.to_string())),
            }
        }

        let plan = LoanPlan::price(&request, &snapshot)?;
        debug!(total = %plan.total(), "Loan priced");

        let active = loan::active_for_customer(&mut tx, customer_id).await?;
        if self.policy.fine.blocks_new_loans(&active, now) {
            return Err(LoanError::OutstandingFine {
                customer_id: customer_id.to_string(),
                amount: self.policy.fine.outstanding(&active, now),
            });
        }

        let (header, lines) = plan.into_loan(customer_id, now);

        loan::insert_loan(&mut tx, &header).await?;
        for line in &lines {
            loan::insert_line(&mut tx, line).await?;
            stock::decrement(&mut tx, &line.book_id, line.quantity).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(LoanReceipt {
            loan_id: header.id,
            customer_id: header.customer_id,
            total_cents: header.total_cents,
            started_at: header.started_at,
            due_at: header.due_at,
            lines,
        })
    }

    // =========================================================================
    // Return
    // =========================================================================

    /// Returns a loan now.
    pub async fn return_loan(&self, loan_id: &str, customer_id: &str) -> LoanResult<ReturnReceipt> {
        self.return_loan_at(loan_id, customer_id, Utc::now()).await
    }

    /// Returns a loan at `now`.
    ///
    /// A second return of the same loan fails with `AlreadyFinalized` and
    /// does not restock anything.
    pub async fn return_loan_at(
        &self,
        loan_id: &str,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> LoanResult<ReturnReceipt> {
        let result = self.try_return(loan_id, customer_id, now).await;

        match &result {
            Ok(receipt) => info!(
                loan_id = %loan_id,
                customer_id = %customer_id,
                restocked = receipt.restocked_units,
                fine_cents = receipt.fine_cents,
                "Loan returned"
            ),
            Err(err) => warn!(loan_id = %loan_id, error = %err, "Loan return rejected"),
        }

        result
    }

    async fn try_return(
        &self,
        loan_id: &str,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> LoanResult<ReturnReceipt> {
        let mut tx = self
            .db
            .pool()
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        if !loan::finalize(&mut tx, loan_id, customer_id, now).await? {
            return match loan::get_by_id(&mut tx, loan_id).await? {
                Some(existing) if existing.customer_id == customer_id => {
                    Err(LoanError::AlreadyFinalized(loan_id.to_string()))
                }
                _ => Err(LoanError::LoanNotFound(loan_id.to_string())),
            };
        }

        let header = loan::get_by_id(&mut tx, loan_id)
            .await?
            .ok_or_else(|| LoanError::LoanNotFound(loan_id.to_string()))?;
        let lines = loan::lines_for_loan(&mut tx, loan_id).await?;

        let mut restocked_units = 0;
        for line in &lines {
            stock::increment(&mut tx, &line.book_id, line.quantity).await?;
            restocked_units += line.quantity;
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(ReturnReceipt {
            loan_id: header.id,
            status: LoanStatus::Finalized,
            returned_at: now,
            restocked_units,
            fine_cents: self.policy.fine.for_due_date(header.due_at, now).cents(),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All loans of a customer, newest first, with lines and current fine.
    pub async fn customer_loans(
        &self,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> LoanResult<Vec<LoanDetails>> {
        let mut conn = self.db.pool().acquire().await.map_err(DbError::from)?;

        let loans = loan::list_for_customer(&mut conn, customer_id).await?;
        let mut details = Vec::with_capacity(loans.len());
        for header in loans {
            let lines = loan::lines_for_loan(&mut conn, &header.id).await?;
            let fine_cents = self.policy.fine.compute(&header, now).cents();
            details.push(LoanDetails {
                loan: header,
                lines,
                fine_cents,
            });
        }

        Ok(details)
    }

    /// One loan of a customer with lines and current fine.
    pub async fn loan_details(
        &self,
        loan_id: &str,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> LoanResult<LoanDetails> {
        let mut conn = self.db.pool().acquire().await.map_err(DbError::from)?;

        let header = loan::get_by_id(&mut conn, loan_id)
            .await?
            .filter(|l| l.customer_id == customer_id)
            .ok_or_else(|| LoanError::LoanNotFound(loan_id.to_string()))?;
        let lines = loan::lines_for_loan(&mut conn, loan_id).await?;
        let fine_cents = self.policy.fine.compute(&header, now).cents();

        Ok(LoanDetails {
            loan: header,
            lines,
            fine_cents,
        })
    }

    /// Total fine the customer owes at `now` across active loans.
    pub async fn pending_fine(&self, customer_id: &str, now: DateTime<Utc>) -> LoanResult<Money> {
        let mut conn = self.db.pool().acquire().await.map_err(DbError::from)?;
        let active = loan::active_for_customer(&mut conn, customer_id).await?;
        Ok(self.policy.fine.outstanding(&active, now))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
