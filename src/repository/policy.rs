//! Policy repository: the singleton circulation-policy row

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};

use crate::{error::AppResult, models::policy::LoanPolicy};

#[derive(Clone)]
pub struct PolicyRepository {
    pool: Pool<Postgres>,
}

impl PolicyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load the current policy.
    ///
    /// A missing row, or a NULL or negative value in any of the three
    /// columns, falls back to the full default record (all-or-nothing,
    /// see `LoanPolicy::from_columns`).
    pub async fn load(&self) -> AppResult<LoanPolicy> {
        let row = sqlx::query(
            "SELECT fine_rate, max_books_per_member, reservation_duration_days \
             FROM config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let policy = match row {
            Some(row) => LoanPolicy::from_columns(
                row.get::<Option<Decimal>, _>("fine_rate"),
                row.get::<Option<i32>, _>("max_books_per_member"),
                row.get::<Option<i32>, _>("reservation_duration_days"),
            ),
            None => {
                tracing::warn!("config row missing, using default loan policy");
                LoanPolicy::default()
            }
        };

        Ok(policy)
    }
}
