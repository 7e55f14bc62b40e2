//! # Error Types
//!
//! Domain error types for biblio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  biblio-core errors (this file)                                        │
//! │  ├── LoanError        - Everything the loan engine can report          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  biblio-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                         (folded into LoanError::StorageFailure)        │
//! │                                                                         │
//! │  Flow: ValidationError → LoanError ← DbError → Presentation Layer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: the engine returns it as a value and the
//! caller decides how to word it for the user.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Loan Error
// =============================================================================

/// Errors returned by loan creation and return.
#[derive(Debug, Error)]
pub enum LoanError {
    /// A cart line references a book that is not in the catalog.
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// Not enough copies to satisfy a cart line.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: (book-b, 2)
    ///      │
    ///      ▼
    /// Check stock: available=1
    ///      │
    ///      ▼
    /// InsufficientStock { book_id: "book-b", available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// No loan row, no stock change
    /// ```
    #[error("Insufficient stock for book {book_id}: available {available}, requested {requested}")]
    InsufficientStock {
        book_id: String,
        available: i64,
        requested: i64,
    },

    /// The customer has an active, overdue loan with a fine to settle.
    #[error("Customer {customer_id} has an outstanding fine of {amount}")]
    OutstandingFine { customer_id: String, amount: Money },

    /// The loan request has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line has a quantity below 1 or above the per-line maximum.
    #[error("Invalid quantity {quantity} for book {book_id}")]
    InvalidQuantity { book_id: String, quantity: i64 },

    /// The loan does not exist or belongs to another customer.
    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    /// The loan was already returned.
    #[error("Loan {0} is already finalized")]
    AlreadyFinalized(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage transaction failed and was rolled back.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl LoanError {
    /// Whether retrying the same call may succeed without changing input.
    pub fn is_transient(&self) -> bool {
        matches!(self, LoanError::StorageFailure(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LoanError.
pub type LoanResult<T> = Result<T, LoanError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LoanError::InsufficientStock {
            book_id: "book-b".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for book book-b: available 1, requested 2"
        );

        let err = LoanError::OutstandingFine {
            customer_id: "c-1".to_string(),
            amount: Money::from_cents(300),
        };
        assert_eq!(
            err.to_string(),
            "Customer c-1 has an outstanding fine of R$3.00"
        );
    }

    #[test]
    fn test_validation_converts_to_loan_error() {
        let validation_err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        let loan_err: LoanError = validation_err.into();
        assert!(matches!(loan_err, LoanError::Validation(_)));
        assert!(!loan_err.is_transient());
    }

    #[test]
    fn test_storage_failure_is_transient() {
        assert!(LoanError::StorageFailure("database is locked".into()).is_transient());
        assert!(!LoanError::EmptyCart.is_transient());
    }
}
