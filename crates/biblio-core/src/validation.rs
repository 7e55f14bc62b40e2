//! # Validation Module
//!
//! Input validation for loan requests and the few identity fields the
//! repositories accept.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation Layer (forms)                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + LoanRequest::normalized                        │
//! │  ├── empty cart, quantity range, duration range                        │
//! │  └── email / name shape                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity >= 1)                         │
//! │  ├── UNIQUE emails                                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_LOAN_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Checks a loan line quantity: 1 ..= MAX_LOAN_QUANTITY.
///
/// ## Example
/// ```rust
/// use biblio_core::validation::is_valid_quantity;
///
/// assert!(is_valid_quantity(1));
/// assert!(!is_valid_quantity(0));
/// ```
#[inline]
pub fn is_valid_quantity(qty: i64) -> bool {
    (1..=MAX_LOAN_QUANTITY).contains(&qty)
}

/// Validates a loan duration in days.
///
/// ## Rules
/// - 0 is allowed (due the same day)
/// - Negative durations are rejected
/// - Must not exceed `max_days`
pub fn validate_duration_days(days: i64, max_days: i64) -> ValidationResult<()> {
    if !(0..=max_days).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "duration_days".to_string(),
            min: 0,
            max: max_days,
        });
    }

    Ok(())
}

/// Validates a price in cents (zero allowed, negative rejected).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address shape (`local@domain.tld`, at most 100 chars).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 100,
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name (1-255 characters after trimming).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 255 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 255,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_quantity() {
        assert!(is_valid_quantity(1));
        assert!(is_valid_quantity(999));

        assert!(!is_valid_quantity(0));
        assert!(!is_valid_quantity(-1));
        assert!(!is_valid_quantity(1000));
    }

    #[test]
    fn test_validate_duration_days() {
        assert!(validate_duration_days(0, 365).is_ok());
        assert!(validate_duration_days(14, 365).is_ok());
        assert!(validate_duration_days(365, 365).is_ok());

        assert!(validate_duration_days(-1, 365).is_err());
        assert!(validate_duration_days(366, 365).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(100))).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Machado de Assis").is_ok());
        assert!(validate_name("name", "   ").is_err());
    }
}
