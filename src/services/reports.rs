//! Reports service: tabular summaries and CSV export

use std::path::Path;

use crate::{
    error::AppResult,
    export,
    models::report::{BookIssueCount, MemberActivity, MemberFines},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Books by number of loans recorded against them, most issued first.
    pub async fn top_issued_books(&self) -> AppResult<Vec<BookIssueCount>> {
        let rows = sqlx::query_as::<_, BookIssueCount>(
            r#"
            SELECT b.id AS book_id, b.title, COUNT(l.id) AS issue_count
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id
            GROUP BY b.id, b.title
            ORDER BY issue_count DESC, b.id
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;
        Ok(rows)
    }

    /// Members by number of loans recorded against them, most active first.
    pub async fn active_members(&self) -> AppResult<Vec<MemberActivity>> {
        let rows = sqlx::query_as::<_, MemberActivity>(
            r#"
            SELECT m.id AS member_id, m.name, COUNT(l.id) AS books_issued
            FROM members m
            LEFT JOIN loans l ON l.member_id = m.id
            GROUP BY m.id, m.name
            ORDER BY books_issued DESC, m.id
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;
        Ok(rows)
    }

    /// Members by total accumulated fines, highest first.
    pub async fn fine_summary(&self) -> AppResult<Vec<MemberFines>> {
        let rows = sqlx::query_as::<_, MemberFines>(
            r#"
            SELECT m.id AS member_id, m.name,
                   COALESCE(SUM(l.fine_amount), 0) AS total_fine
            FROM members m
            LEFT JOIN loans l ON l.member_id = m.id
            GROUP BY m.id, m.name
            ORDER BY total_fine DESC, m.id
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;
        Ok(rows)
    }

    /// Export the three standard reports as CSV files into `dir`.
    ///
    /// Each file carries a literal header row; fields containing commas or
    /// quotes are quoted RFC-4180 style by the writer.
    pub async fn export_reports(&self, dir: &Path) -> AppResult<()> {
        let top_books = self.top_issued_books().await?;
        export::write_csv(
            dir.join("top_issued_books.csv"),
            &["BookID", "Title", "IssueCount"],
            top_books.iter().map(|r| {
                vec![r.book_id.to_string(), r.title.clone(), r.issue_count.to_string()]
            }),
        )?;

        let members = self.active_members().await?;
        export::write_csv(
            dir.join("active_members.csv"),
            &["MemberID", "Name", "BooksIssued"],
            members.iter().map(|r| {
                vec![r.member_id.to_string(), r.name.clone(), r.books_issued.to_string()]
            }),
        )?;

        let fines = self.fine_summary().await?;
        export::write_csv(
            dir.join("fine_summary.csv"),
            &["MemberID", "Name", "TotalFine"],
            fines.iter().map(|r| {
                vec![r.member_id.to_string(), r.name.clone(), r.total_fine.to_string()]
            }),
        )?;

        tracing::info!(dir = %dir.display(), "reports exported");
        Ok(())
    }
}
