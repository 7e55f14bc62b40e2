//! # Domain Types
//!
//! Core domain types shared by the engine, the repositories and the
//! presentation layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Loan       │   │    LoanLine     │       │
//! │  │  ─────────────  │1 N│  ─────────────  │1 N│  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (UUID)      │──►│  book_id (FK)   │       │
//! │  │  email (unique) │   │  status         │   │  quantity ≥ 1   │       │
//! │  │  Address 0..1   │   │  total_cents    │   │  unit_price ◄── snapshot│
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ N               │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │    Manager      │1 N│      Book       │   │   LoanStatus    │       │
//! │  │  email (unique) │──►│  stock ≥ 0      │   │  Active         │       │
//! │  │  admin by email │   │  price_cents    │   │  Finalized      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A book in the catalog.
///
/// `stock` is only changed by loan creation (decrement) and loan return
/// (increment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    pub id: String,
    pub title: String,
    pub isbn: Option<String>,
    pub year: Option<i32>,
    pub author_id: Option<String>,
    pub publisher_id: Option<String>,
    pub genre_id: Option<String>,
    pub country_of_origin: Option<String>,
    /// Copies available for loan.
    pub stock: i64,
    /// Current unit price in cents. Existing loans keep their own snapshot.
    pub price_cents: i64,
    /// Manager who registered the book.
    pub manager_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Returns the current price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Pricing and stock view used by the loan engine.
    pub fn stock_view(&self) -> BookStock {
        BookStock {
            book_id: self.id.clone(),
            price_cents: self.price_cents,
            stock: self.stock,
        }
    }
}

/// The slice of a book the loan engine reads: price and stock, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BookStock {
    pub book_id: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl BookStock {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Loan Status
// =============================================================================

/// The status of a loan.
///
/// The only transition is `Active → Finalized`, performed by a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Books are with the customer.
    Active,
    /// Books were returned and restocked.
    Finalized,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Finalized => "finalized",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Active
    }
}

// =============================================================================
// Loan
// =============================================================================

/// Loan header (aggregate root).
///
/// `total_cents` equals the sum of the line prices at creation and never
/// changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Loan {
    pub id: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub due_at: DateTime<Utc>,
    pub status: LoanStatus,
    pub total_cents: i64,
    #[ts(as = "Option<String>")]
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Active and past the due timestamp.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now > self.due_at
    }
}

/// A line of a loan.
/// Uses snapshot pattern to freeze the book price at time of loan.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LoanLine {
    pub id: String,
    pub loan_id: String,
    pub book_id: String,
    /// Position in the original cart (0-based).
    pub position: i64,
    pub quantity: i64,
    /// Unit price in cents at time of loan (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub line_price_cents: i64,
}

impl LoanLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_price(&self) -> Money {
        Money::from_cents(self.line_price_cents)
    }
}

/// A loan with its lines and the fine owed right now.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoanDetails {
    pub loan: Loan,
    pub lines: Vec<LoanLine>,
    pub fine_cents: i64,
}

/// Result of a successful loan creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoanReceipt {
    pub loan_id: String,
    pub customer_id: String,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub due_at: DateTime<Utc>,
    pub lines: Vec<LoanLine>,
}

impl LoanReceipt {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Result of a successful loan return.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnReceipt {
    pub loan_id: String,
    pub status: LoanStatus,
    #[ts(as = "String")]
    pub returned_at: DateTime<Utc>,
    /// Copies put back on the shelf across all lines.
    pub restocked_units: i64,
    /// Fine accrued at return time. Informational only.
    pub fine_cents: i64,
}

// =============================================================================
// People
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Opaque hash produced by the authentication collaborator.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Postal address of a customer (at most one per customer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    pub customer_id: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
}

/// Library staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Manager {
    pub id: String,
    pub code: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Manager {
    /// The administrator is the manager registered under the configured
    /// administrator email (case-insensitive).
    pub fn is_administrator(&self, admin_email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(admin_email.trim())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn loan(status: LoanStatus, due_in: Duration) -> Loan {
        let now = Utc::now();
        Loan {
            id: "loan-1".into(),
            customer_id: "c-1".into(),
            started_at: now,
            due_at: now + due_in,
            status,
            total_cents: 2000,
            returned_at: None,
        }
    }

    #[test]
    fn test_loan_status_default() {
        assert_eq!(LoanStatus::default(), LoanStatus::Active);
        assert_eq!(LoanStatus::Finalized.as_str(), "finalized");
    }

    #[test]
    fn test_loan_status_serializes_snake_case() {
        let json = serde_json::to_string(&LoanStatus::Finalized).unwrap();
        assert_eq!(json, "\"finalized\"");
    }

    #[test]
    fn test_is_overdue_only_when_active() {
        let now = Utc::now();
        let overdue = loan(LoanStatus::Active, Duration::days(-2));
        assert!(overdue.is_overdue(now));

        let returned = loan(LoanStatus::Finalized, Duration::days(-2));
        assert!(!returned.is_overdue(now));

        let current = loan(LoanStatus::Active, Duration::days(3));
        assert!(!current.is_overdue(now));
    }

    #[test]
    fn test_manager_is_administrator() {
        let manager = Manager {
            id: "m-1".into(),
            code: Some(1),
            name: "Admin".into(),
            phone: None,
            email: "Admin@Biblio.local".into(),
            password_hash: "x".into(),
        };
        assert!(manager.is_administrator("admin@biblio.local"));
        assert!(!manager.is_administrator("someone@biblio.local"));
    }

    #[test]
    fn test_customer_hash_not_serialized() {
        let customer = Customer {
            id: "c-1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "secret-hash".into(),
            phone: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&customer).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
