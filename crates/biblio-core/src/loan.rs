//! # Loan Requests and Pricing
//!
//! The pure half of loan creation: turning a cart into a validated,
//! priced plan that the engine can persist as-is.
//!
//! ## Create Loan, Pure Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LoanRequest { [(A,2), (B,1), (A,1)], 14 days }                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalized()                                                           │
//! │  ├── empty?              → EmptyCart                                    │
//! │  ├── qty < 1 or > 999?   → InvalidQuantity                              │
//! │  ├── duration range?     → Validation(OutOfRange)                       │
//! │  └── merge duplicates    → [(A,3), (B,1)]                               │
//! │       │                                                                 │
//! │       ▼   BookStock rows read inside the engine's transaction           │
//! │  LoanPlan::price()                                                      │
//! │  ├── unknown book?       → BookNotFound                                 │
//! │  ├── stock < qty?        → InsufficientStock                            │
//! │  └── snapshot unit price, line = qty × unit, total = Σ line             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{LoanError, LoanResult, ValidationError};
use crate::fine::FinePolicy;
use crate::money::Money;
use crate::types::{BookStock, Loan, LoanLine, LoanStatus};
use crate::validation::{is_valid_quantity, validate_duration_days};
use crate::{MAX_CART_LINES, MAX_LOAN_DAYS};

// =============================================================================
// Policy
// =============================================================================

/// Tunables of the loan engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPolicy {
    pub fine: FinePolicy,
    /// Longest loan a caller may ask for, in days.
    pub max_duration_days: i64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        LoanPolicy {
            fine: FinePolicy::default(),
            max_duration_days: MAX_LOAN_DAYS,
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// One (book, quantity) pair collected by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub book_id: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(book_id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            book_id: book_id.into(),
            quantity,
        }
    }
}

/// A loan request: the cart plus the requested duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoanRequest {
    pub items: Vec<CartLine>,
    pub duration_days: i64,
}

impl LoanRequest {
    pub fn new(items: Vec<CartLine>, duration_days: i64) -> Self {
        LoanRequest {
            items,
            duration_days,
        }
    }

    /// Validates the request and merges duplicate books.
    ///
    /// Lines keep the position of the first occurrence of their book.
    pub fn normalized(&self, max_duration_days: i64) -> LoanResult<LoanRequest> {
        if self.items.is_empty() {
            return Err(LoanError::EmptyCart);
        }

        if let Some(bad) = self.items.iter().find(|i| !is_valid_quantity(i.quantity)) {
            return Err(LoanError::InvalidQuantity {
                book_id: bad.book_id.clone(),
                quantity: bad.quantity,
            });
        }

        if let Some(blank) = self.items.iter().find(|i| i.book_id.trim().is_empty()) {
            return Err(ValidationError::Required {
                field: format!("book_id (quantity {})", blank.quantity),
            }
            .into());
        }

        validate_duration_days(self.duration_days, max_duration_days)?;

        let mut merged: Vec<CartLine> = Vec::with_capacity(self.items.len());
        let mut index: HashMap<&str, usize> = HashMap::new();

        for item in &self.items {
            match index.get(item.book_id.as_str()) {
                Some(&at) => {
                    let line = &mut merged[at];
                    line.quantity += item.quantity;
                    if !is_valid_quantity(line.quantity) {
                        return Err(LoanError::InvalidQuantity {
                            book_id: line.book_id.clone(),
                            quantity: line.quantity,
                        });
                    }
                }
                None => {
                    index.insert(item.book_id.as_str(), merged.len());
                    merged.push(item.clone());
                }
            }
        }

        if merged.len() > MAX_CART_LINES {
            return Err(ValidationError::OutOfRange {
                field: "cart lines".to_string(),
                min: 1,
                max: MAX_CART_LINES as i64,
            }
            .into());
        }

        Ok(LoanRequest {
            items: merged,
            duration_days: self.duration_days,
        })
    }

    /// Distinct book ids, in cart order.
    pub fn book_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !ids.contains(&item.book_id.as_str()) {
                ids.push(item.book_id.as_str());
            }
        }
        ids
    }
}

// =============================================================================
// Plan
// =============================================================================

/// A cart line with its snapshotted price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub book_id: String,
    pub position: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_price: Money,
}

/// A priced, stock-checked loan ready to be persisted.
///
/// Built from a normalized request and the `BookStock` rows read inside the
/// same transaction that will write the loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPlan {
    lines: Vec<PlannedLine>,
    total: Money,
    duration_days: i64,
}

impl LoanPlan {
    /// Prices `request` against `stock`.
    ///
    /// All books are resolved before any stock is compared, so a cart with
    /// both a missing book and a short one reports `BookNotFound`.
    pub fn price(request: &LoanRequest, stock: &[BookStock]) -> LoanResult<LoanPlan> {
        if request.items.is_empty() {
            return Err(LoanError::EmptyCart);
        }

        let by_id: HashMap<&str, &BookStock> =
            stock.iter().map(|s| (s.book_id.as_str(), s)).collect();

        let resolved = request
            .items
            .iter()
            .map(|item| {
                by_id
                    .get(item.book_id.as_str())
                    .copied()
                    .ok_or_else(|| LoanError::BookNotFound(item.book_id.clone()))
            })
            .collect::<LoanResult<Vec<&BookStock>>>()?;

        for (item, book) in request.items.iter().zip(&resolved) {
            if book.stock < item.quantity {
                return Err(LoanError::InsufficientStock {
                    book_id: item.book_id.clone(),
                    available: book.stock,
                    requested: item.quantity,
                });
            }
        }

        let mut lines = Vec::with_capacity(request.items.len());
        let mut total = Money::zero();

        for (position, (item, book)) in request.items.iter().zip(&resolved).enumerate() {
            let unit_price = book.price();
            let line_price = unit_price
                .checked_multiply(item.quantity)
                .ok_or_else(|| overflow(&item.book_id))?;
            total = total
                .checked_add(line_price)
                .ok_or_else(|| overflow(&item.book_id))?;

            lines.push(PlannedLine {
                book_id: item.book_id.clone(),
                position: position as i64,
                quantity: item.quantity,
                unit_price,
                line_price,
            });
        }

        Ok(LoanPlan {
            lines,
            total,
            duration_days: request.duration_days,
        })
    }

    pub fn lines(&self) -> &[PlannedLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Due timestamp for a loan starting at `started_at`.
    pub fn due_at(&self, started_at: DateTime<Utc>) -> DateTime<Utc> {
        started_at + Duration::days(self.duration_days)
    }

    /// Materialises the loan header and lines with fresh ids.
    pub fn into_loan(self, customer_id: &str, started_at: DateTime<Utc>) -> (Loan, Vec<LoanLine>) {
        let loan_id = Uuid::new_v4().to_string();

        let loan = Loan {
            id: loan_id.clone(),
            customer_id: customer_id.to_string(),
            started_at,
            due_at: self.due_at(started_at),
            status: LoanStatus::Active,
            total_cents: self.total.cents(),
            returned_at: None,
        };

        let lines = self
            .lines
            .into_iter()
            .map(|line| LoanLine {
                id: Uuid::new_v4().to_string(),
                loan_id: loan_id.clone(),
                book_id: line.book_id,
                position: line.position,
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                line_price_cents: line.line_price.cents(),
            })
            .collect();

        (loan, lines)
    }
}

fn overflow(book_id: &str) -> LoanError {
    ValidationError::OutOfRange {
        field: format!("price total for book {book_id}"),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, price_cents: i64, stock: i64) -> BookStock {
        BookStock {
            book_id: id.to_string(),
            price_cents,
            stock,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let request = LoanRequest::new(vec![], 14);
        assert!(matches!(request.normalized(365), Err(LoanError::EmptyCart)));
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let request = LoanRequest::new(vec![CartLine::new("a", 1), CartLine::new("b", 0)], 14);
        match request.normalized(365) {
            Err(LoanError::InvalidQuantity { book_id, quantity }) => {
                assert_eq!(book_id, "b");
                assert_eq!(quantity, 0);
            }
            other => panic!("expected InvalidQuantity, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_duration_rejected() {
        let request = LoanRequest::new(vec![CartLine::new("a", 1)], -1);
        assert!(matches!(request.normalized(365), Err(LoanError::Validation(_))));

        let same_day = LoanRequest::new(vec![CartLine::new("a", 1)], 0);
        assert!(same_day.normalized(365).is_ok());
    }

    #[test]
    fn test_duplicates_merged_in_first_position() {
        let request = LoanRequest::new(
            vec![
                CartLine::new("a", 2),
                CartLine::new("b", 1),
                CartLine::new("a", 1),
            ],
            14,
        );
        let normalized = request.normalized(365).unwrap();
        assert_eq!(
            normalized.items,
            vec![CartLine::new("a", 3), CartLine::new("b", 1)]
        );
        assert_eq!(normalized.book_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_merged_quantity_over_limit() {
        let request = LoanRequest::new(vec![CartLine::new("a", 600), CartLine::new("a", 600)], 14);
        assert!(matches!(
            request.normalized(365),
            Err(LoanError::InvalidQuantity { quantity: 1200, .. })
        ));
    }

    #[test]
    fn test_price_snapshot_and_total() {
        let request = LoanRequest::new(vec![CartLine::new("a", 2), CartLine::new("b", 3)], 14);
        let plan = LoanPlan::price(&request, &[stock("a", 1000, 5), stock("b", 350, 3)]).unwrap();

        assert_eq!(plan.lines()[0].line_price.cents(), 2000);
        assert_eq!(plan.lines()[1].unit_price.cents(), 350);
        assert_eq!(plan.lines()[1].line_price.cents(), 1050);
        assert_eq!(plan.total().cents(), 3050);
        assert_eq!(plan.lines()[1].position, 1);
    }

    #[test]
    fn test_unknown_book() {
        let request = LoanRequest::new(vec![CartLine::new("a", 1), CartLine::new("zzz", 9)], 14);
        let err = LoanPlan::price(&request, &[stock("a", 1000, 0)]).unwrap_err();
        assert!(matches!(err, LoanError::BookNotFound(id) if id == "zzz"));
    }

    #[test]
    fn test_insufficient_stock() {
        let request = LoanRequest::new(vec![CartLine::new("b", 2)], 14);
        let err = LoanPlan::price(&request, &[stock("b", 1000, 1)]).unwrap_err();
        match err {
            LoanError::InsufficientStock {
                book_id,
                available,
                requested,
            } => {
                assert_eq!(book_id, "b");
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_into_loan() {
        let request = LoanRequest::new(vec![CartLine::new("a", 2)], 14);
        let plan = LoanPlan::price(&request, &[stock("a", 1000, 5)]).unwrap();
        let now = Utc::now();

        let (loan, lines) = plan.into_loan("c-1", now);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.total_cents, 2000);
        assert_eq!(loan.due_at - loan.started_at, Duration::days(14));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].loan_id, loan.id);
        assert_eq!(
            lines.iter().map(|l| l.line_price_cents).sum::<i64>(),
            loan.total_cents
        );
    }
}
