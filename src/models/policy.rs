//! Loan policy record (store-resident singleton)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable circulation policy, read from the singleton `config` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// Currency amount charged per whole day overdue.
    pub fine_rate: Decimal,
    pub max_books_per_member: i32,
    pub reservation_duration_days: i32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            fine_rate: Decimal::new(100, 2), // 1.00
            max_books_per_member: 5,
            reservation_duration_days: 7,
        }
    }
}

impl LoanPolicy {
    /// Build a policy from the singleton row's nullable columns.
    ///
    /// The fallback is all-or-nothing: if any of the three values is
    /// missing or negative, the entire default record is used, discarding
    /// the values that did parse. This mirrors the long-standing behaviour
    /// callers depend on.
    pub fn from_columns(
        fine_rate: Option<Decimal>,
        max_books_per_member: Option<i32>,
        reservation_duration_days: Option<i32>,
    ) -> Self {
        match (fine_rate, max_books_per_member, reservation_duration_days) {
            (Some(fine_rate), Some(max_books_per_member), Some(reservation_duration_days))
                if fine_rate >= Decimal::ZERO
                    && max_books_per_member >= 0
                    && reservation_duration_days >= 0 =>
            {
                Self {
                    fine_rate,
                    max_books_per_member,
                    reservation_duration_days,
                }
            }
            _ => Self::default(),
        }
    }
}
