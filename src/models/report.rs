//! Report row models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-book issue count, most issued first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookIssueCount {
    pub book_id: i32,
    pub title: String,
    pub issue_count: i64,
}

/// Per-member issued-loan count, most active first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberActivity {
    pub member_id: i32,
    pub name: String,
    pub books_issued: i64,
}

/// Per-member accumulated fines, highest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberFines {
    pub member_id: i32,
    pub name: String,
    pub total_fine: Decimal,
}
