//! Loans repository: the transactional circulation core
//!
//! Issue and return are multi-statement atomic units. Each runs inside a
//! store transaction; the availability read for issuing takes a row lock
//! (`FOR UPDATE`) that is held through the paired book update, so two
//! concurrent sessions cannot both observe "available" and double-issue.
//! The sqlx transaction guard rolls back on drop, so every early-return
//! path leaves the store unchanged and the connection back in auto-commit.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Availability,
        loan::{Loan, LoanStatus, ReturnReceipt},
        policy::LoanPolicy,
    },
};

/// Fine for a loan returned at `returned`, given its due date.
///
/// Whole days past the due date, never negative; partial days do not count.
/// Uses the rate in force at return time.
pub fn compute_fine(due_date: DateTime<Utc>, returned: DateTime<Utc>, rate: Decimal) -> Decimal {
    let days_late = (returned.date_naive() - due_date.date_naive()).num_days();
    if days_late <= 0 {
        Decimal::ZERO
    } else {
        Decimal::from(days_late) * rate
    }
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Number of currently issued loans held by a member.
    pub async fn count_issued(&self, member_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND status = 'Issued'",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Issue a book to a member.
    ///
    /// Preconditions, checked in order inside one store transaction:
    /// the book exists and is available (row locked), the member exists,
    /// and the member holds fewer issued loans than the policy maximum.
    /// On success a loan row is inserted and the book flips to Unavailable
    /// as a single atomic unit.
    pub async fn issue(
        &self,
        book_id: i32,
        member_id: i32,
        policy: &LoanPolicy,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Lock the book row for the duration of the transaction.
        let availability: Option<Availability> = sqlx::query_scalar(
            "SELECT availability FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let availability = availability
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if availability == Availability::Unavailable {
            return Err(AppError::Conflict(format!(
                "Book {} is not available",
                book_id
            )));
        }

        let member_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
                .bind(member_id)
                .fetch_one(&mut *tx)
                .await?;
        if !member_exists {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }

        let issued: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND status = 'Issued'",
        )
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        if issued >= policy.max_books_per_member as i64 {
            return Err(AppError::LimitReached(format!(
                "Member {} already holds {} of {} allowed loans",
                member_id, issued, policy.max_books_per_member
            )));
        }

        let now = Utc::now();
        let due_date = now + Duration::days(policy.reservation_duration_days as i64);

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, issue_date, due_date, status)
            VALUES ($1, $2, $3, $4, 'Issued')
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = 'Unavailable' WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(loan_id = loan.id, book_id, member_id, "book issued");
        Ok(loan)
    }

    /// Record a reservation for a currently unavailable book.
    ///
    /// Reservations never mutate book state, so this is a single
    /// auto-commit insert. A Reserved loan is terminal in this design.
    pub async fn reserve(
        &self,
        book_id: i32,
        member_id: i32,
        policy: &LoanPolicy,
    ) -> AppResult<Loan> {
        let availability: Option<Availability> =
            sqlx::query_scalar("SELECT availability FROM books WHERE id = $1")
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await?;

        let availability = availability
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if availability == Availability::Available {
            return Err(AppError::Conflict(format!(
                "Book {} is available, issue it instead of reserving",
                book_id
            )));
        }

        let member_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;
        if !member_exists {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                member_id
            )));
        }

        let now = Utc::now();
        let due_date = now + Duration::days(policy.reservation_duration_days as i64);

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, issue_date, due_date, status)
            VALUES ($1, $2, $3, $4, 'Reserved')
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(loan_id = loan.id, book_id, member_id, "book reserved");
        Ok(loan)
    }

    /// Close an open loan, computing any overdue fine.
    ///
    /// The loan row is locked, moved to its terminal Returned state and the
    /// book made available again, all in one store transaction. Returning
    /// the same loan twice yields a Conflict and leaves state untouched.
    pub async fn return_loan(&self, loan_id: i32, policy: &LoanPolicy) -> AppResult<ReturnReceipt> {
        let mut tx = self.pool.begin().await?;

        let loan: Option<Loan> =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
                .bind(loan_id)
                .fetch_optional(&mut *tx)
                .await?;

        let loan = loan
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        match loan.status {
            LoanStatus::Issued => {}
            LoanStatus::Returned => {
                return Err(AppError::Conflict(format!(
                    "Loan {} was already returned",
                    loan_id
                )));
            }
            LoanStatus::Reserved => {
                // Reservations are not open loans.
                return Err(AppError::NotFound(format!(
                    "No open loan with id {}",
                    loan_id
                )));
            }
        }

        let now = Utc::now();
        let fine = compute_fine(loan.due_date, now, policy.fine_rate);

        sqlx::query(
            "UPDATE loans SET status = 'Returned', return_date = $1, fine_amount = $2 WHERE id = $3",
        )
        .bind(now)
        .bind(fine)
        .bind(loan_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = 'Available' WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(loan_id, book_id = loan.book_id, %fine, "book returned");
        Ok(ReturnReceipt {
            loan_id,
            book_id: loan.book_id,
            returned_at: now,
            fine,
        })
    }

    /// A member's full loan history, newest first.
    pub async fn history(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE member_id = $1 ORDER BY issue_date DESC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}
