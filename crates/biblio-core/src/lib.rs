//! # biblio-core: Pure Loan Logic for Biblio
//!
//! Everything the loan lifecycle needs that does not touch storage:
//! domain types, integer money, cart normalisation and pricing, the fine
//! policy, and the error taxonomy returned by the engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Biblio Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation Layer (external)                      │   │
//! │  │    cart form ──► create_loan   ·   my loans ──► return_loan     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ customer_id + LoanRequest              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            biblio-db: LoanEngine (one transaction per call)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ biblio-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   loan    │  │   fine    │  │   │
//! │  │   │   Book    │  │   Money   │  │ LoanPlan  │  │FinePolicy │  │   │
//! │  │   │   Loan    │  │           │  │  pricing  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Loan, LoanLine, Customer, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`loan`] - Loan requests, cart normalisation and pricing
//! - [`fine`] - Fine policy for overdue loans
//! - [`error`] - Loan and validation error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use biblio_core::loan::{CartLine, LoanPlan, LoanRequest};
//! use biblio_core::types::BookStock;
//!
//! let request = LoanRequest::new(vec![CartLine::new("book-a", 2)], 14);
//! let stock = vec![BookStock { book_id: "book-a".into(), price_cents: 1000, stock: 5 }];
//!
//! let plan = LoanPlan::price(&request.normalized(365).unwrap(), &stock).unwrap();
//! assert_eq!(plan.total().cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fine;
pub mod loan;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{LoanError, LoanResult, ValidationError};
pub use fine::FinePolicy;
pub use loan::{CartLine, LoanPlan, LoanPolicy, LoanRequest, PlannedLine};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct books in a single loan.
pub const MAX_CART_LINES: usize = 100;

/// Maximum copies of one book in a single loan line.
///
/// ## Business Reason
/// Catches typing mistakes (1000 instead of 10) before they reach the
/// stock check.
pub const MAX_LOAN_QUANTITY: i64 = 999;

/// Default loan duration offered to callers, in days.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Upper bound for a loan duration unless configured otherwise, in days.
pub const MAX_LOAN_DAYS: i64 = 365;
