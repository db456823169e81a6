//! Circulation service: issue, reserve, return and loan history
//!
//! Policy values are loaded fresh for every operation, so a fine computed
//! at return time always uses the rate in force at return time, not at
//! issue time.

use crate::{
    error::AppResult,
    models::loan::{Loan, ReturnReceipt},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend an available book to a member, creating an open loan.
    pub async fn issue_book(&self, book_id: i32, member_id: i32) -> AppResult<Loan> {
        let policy = self.repository.policy.load().await?;
        self.repository.loans.issue(book_id, member_id, &policy).await
    }

    /// Record member interest in a currently unavailable book.
    pub async fn reserve_book(&self, book_id: i32, member_id: i32) -> AppResult<Loan> {
        let policy = self.repository.policy.load().await?;
        self.repository.loans.reserve(book_id, member_id, &policy).await
    }

    /// Close an open loan, computing any overdue fine.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<ReturnReceipt> {
        let policy = self.repository.policy.load().await?;
        self.repository.loans.return_loan(loan_id, &policy).await
    }

    /// A member's loan history, newest first.
    pub async fn history(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        // Verify member exists
        self.repository.members.get_by_id(member_id).await?;
        self.repository.loans.history(member_id).await
    }
}
