//! # Fine Policy
//!
//! Computes what a customer owes for keeping books past the due date.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Loan status    now vs due_at        fine                               │
//! │  ───────────    ─────────────        ────                               │
//! │  Finalized      any                  0                                  │
//! │  Active         now <= due_at        0                                  │
//! │  Active         now >  due_at        daily_rate × started days overdue  │
//! │                                      (clamped to cap, if any)           │
//! │                                                                         │
//! │  due 10:00, now 10:01 next day  → 2 started days                        │
//! │  due 10:00, now 10:00:01 same   → 1 started day                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fines are never persisted. The engine only asks whether any active loan
//! of the customer has a fine above zero before creating a new loan.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Loan;

const SECONDS_PER_DAY: i64 = 86_400;

/// Default fine per overdue day: R$1.00.
pub const DEFAULT_DAILY_RATE_CENTS: i64 = 100;

/// Per-day fine with an optional ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    pub daily_rate: Money,
    pub cap: Option<Money>,
}

impl FinePolicy {
    pub const fn new(daily_rate: Money) -> Self {
        FinePolicy {
            daily_rate,
            cap: None,
        }
    }

    /// Sets a ceiling on the fine of a single loan.
    pub const fn with_cap(mut self, cap: Money) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Fine owed for `loan` at `now`.
    pub fn compute(&self, loan: &Loan, now: DateTime<Utc>) -> Money {
        if !loan.is_active() {
            return Money::zero();
        }

        self.for_due_date(loan.due_at, now)
    }

    /// Fine for something due at `due_at`, regardless of loan status.
    ///
    /// Used to report what a loan had accrued at the moment it was returned.
    pub fn for_due_date(&self, due_at: DateTime<Utc>, now: DateTime<Utc>) -> Money {
        let days = days_overdue(due_at, now);
        if days == 0 {
            return Money::zero();
        }

        let fine = self
            .daily_rate
            .checked_multiply(days)
            .unwrap_or(Money::from_cents(i64::MAX));

        match self.cap {
            Some(cap) => fine.min(cap),
            None => fine,
        }
    }

    /// Sum of the fines over `loans` at `now`.
    pub fn outstanding<'a, I>(&self, loans: I, now: DateTime<Utc>) -> Money
    where
        I: IntoIterator<Item = &'a Loan>,
    {
        loans
            .into_iter()
            .map(|loan| self.compute(loan, now))
            .fold(Money::zero(), |acc, fine| {
                acc.checked_add(fine).unwrap_or(Money::from_cents(i64::MAX))
            })
    }

    /// True when any of `loans` has a fine above zero.
    pub fn blocks_new_loans<'a, I>(&self, loans: I, now: DateTime<Utc>) -> bool
    where
        I: IntoIterator<Item = &'a Loan>,
    {
        loans
            .into_iter()
            .any(|loan| self.compute(loan, now).is_positive())
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        FinePolicy::new(Money::from_cents(DEFAULT_DAILY_RATE_CENTS))
    }
}

/// Started days between `due_at` and `now`; 0 when not past due.
pub fn days_overdue(due_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let late = now - due_at;
    if late <= Duration::zero() {
        return 0;
    }

    let secs = late.num_seconds();
    ((secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanStatus;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()
    }

    fn loan(status: LoanStatus) -> Loan {
        Loan {
            id: "loan-1".into(),
            customer_id: "c-1".into(),
            started_at: due() - Duration::days(14),
            due_at: due(),
            status,
            total_cents: 2000,
            returned_at: None,
        }
    }

    #[test]
    fn test_days_overdue() {
        assert_eq!(days_overdue(due(), due() - Duration::hours(1)), 0);
        assert_eq!(days_overdue(due(), due()), 0);
        assert_eq!(days_overdue(due(), due() + Duration::milliseconds(10)), 1);
        assert_eq!(days_overdue(due(), due() + Duration::hours(23)), 1);
        assert_eq!(days_overdue(due(), due() + Duration::days(1)), 1);
        assert_eq!(days_overdue(due(), due() + Duration::days(1) + Duration::minutes(1)), 2);
    }

    #[test]
    fn test_no_fine_before_due() {
        let policy = FinePolicy::default();
        let fine = policy.compute(&loan(LoanStatus::Active), due() - Duration::days(3));
        assert!(fine.is_zero());
    }

    #[test]
    fn test_fine_scales_with_days() {
        let policy = FinePolicy::default();
        let fine = policy.compute(&loan(LoanStatus::Active), due() + Duration::days(3));
        assert_eq!(fine.cents(), 300);
    }

    #[test]
    fn test_finalized_loan_owes_nothing() {
        let policy = FinePolicy::default();
        let fine = policy.compute(&loan(LoanStatus::Finalized), due() + Duration::days(30));
        assert!(fine.is_zero());
    }

    #[test]
    fn test_for_due_date_ignores_status() {
        let policy = FinePolicy::default();
        let returned = loan(LoanStatus::Finalized);
        let at_return = policy.for_due_date(returned.due_at, due() + Duration::hours(30));
        assert_eq!(at_return.cents(), 200);
    }

    #[test]
    fn test_cap() {
        let policy = FinePolicy::new(Money::from_cents(250)).with_cap(Money::from_cents(1000));
        let fine = policy.compute(&loan(LoanStatus::Active), due() + Duration::days(10));
        assert_eq!(fine.cents(), 1000);
    }

    #[test]
    fn test_outstanding_and_gate() {
        let policy = FinePolicy::default();
        let now = due() + Duration::days(2);
        let loans = vec![loan(LoanStatus::Active), loan(LoanStatus::Finalized)];

        assert_eq!(policy.outstanding(&loans, now).cents(), 200);
        assert!(policy.blocks_new_loans(&loans, now));
        assert!(!policy.blocks_new_loans(&loans, due() - Duration::days(1)));
        assert!(!policy.blocks_new_loans(&Vec::<Loan>::new(), now));
    }

    #[test]
    fn test_zero_rate_never_blocks() {
        let policy = FinePolicy::new(Money::zero());
        let now = due() + Duration::days(5);
        assert!(!policy.blocks_new_loans(&[loan(LoanStatus::Active)], now));
    }
}
