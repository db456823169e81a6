//! Paginated tabular presentation
//!
//! Any result set that implements [`Tabular`] can be walked page by page
//! with [`Pager`] and rendered as fixed-width text with [`TableView`].
//! Navigation is driven by the caller (a menu, a REPL) through
//! [`PageCommand`]; out-of-range moves are no-ops.

use crate::models::{
    book::Book,
    loan::Loan,
    member::Member,
    report::{BookIssueCount, MemberActivity, MemberFines},
};

/// Rows shown per page.
pub const PAGE_SIZE: usize = 5;

/// A display column: header and fixed width.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub width: usize,
}

const fn col(header: &'static str, width: usize) -> Column {
    Column { header, width }
}

/// A result row shape that can be shown in a table.
///
/// Cells are nullable; an absent value renders as an empty cell, never the
/// literal text "NULL".
pub trait Tabular {
    fn columns() -> &'static [Column];
    fn row(&self) -> Vec<Option<String>>;
}

impl Tabular for Book {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("ID", 5),
            col("Title", 25),
            col("Authors", 20),
            col("Genre", 12),
            col("Publisher", 15),
            col("Ed.", 8),
            col("Year", 6),
            col("Price", 8),
            col("Rack", 10),
            col("Language", 12),
            col("Avail", 12),
        ];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.id.to_string()),
            Some(self.title.clone()),
            Some(self.authors.clone()),
            self.genre.clone(),
            self.publisher.clone(),
            self.edition.clone(),
            self.published_year.map(|y| y.to_string()),
            self.price.map(|p| p.to_string()),
            self.rack_location.clone(),
            self.language.clone(),
            Some(self.availability.to_string()),
        ]
    }
}

impl Tabular for Member {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] =
            &[col("ID", 8), col("Name", 30), col("Email", 30), col("Type", 10)];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.id.to_string()),
            Some(self.name.clone()),
            Some(self.email.clone()),
            Some(self.membership_type.to_string()),
        ]
    }
}

impl Tabular for Loan {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("ID", 8),
            col("BookID", 10),
            col("MemberID", 10),
            col("IssueDate", 12),
            col("DueDate", 12),
            col("Status", 10),
            col("Fine", 8),
        ];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.id.to_string()),
            Some(self.book_id.to_string()),
            Some(self.member_id.to_string()),
            Some(self.issue_date.format("%Y-%m-%d").to_string()),
            Some(self.due_date.format("%Y-%m-%d").to_string()),
            Some(self.status.to_string()),
            self.fine_amount.map(|f| f.to_string()),
        ]
    }
}

impl Tabular for BookIssueCount {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] =
            &[col("BookID", 8), col("Title", 30), col("IssueCount", 12)];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.book_id.to_string()),
            Some(self.title.clone()),
            Some(self.issue_count.to_string()),
        ]
    }
}

impl Tabular for MemberActivity {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] =
            &[col("MemberID", 10), col("Name", 30), col("BooksIssued", 15)];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.member_id.to_string()),
            Some(self.name.clone()),
            Some(self.books_issued.to_string()),
        ]
    }
}

impl Tabular for MemberFines {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] =
            &[col("MemberID", 10), col("Name", 30), col("TotalFine", 15)];
        COLUMNS
    }

    fn row(&self) -> Vec<Option<String>> {
        vec![
            Some(self.member_id.to_string()),
            Some(self.name.clone()),
            Some(self.total_fine.to_string()),
        ]
    }
}

/// Navigation command, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Next,
    Previous,
    Quit,
}

impl PageCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Some(PageCommand::Next),
            "p" | "prev" | "previous" => Some(PageCommand::Previous),
            "q" | "quit" => Some(PageCommand::Quit),
            _ => None,
        }
    }
}

/// Page cursor over `total` rows, [`PAGE_SIZE`] rows per page.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    total: usize,
    page: usize,
}

impl Pager {
    pub fn new(total: usize) -> Self {
        Self { total, page: 0 }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// Row range of the current page.
    pub fn bounds(&self) -> std::ops::Range<usize> {
        let start = self.page * PAGE_SIZE;
        start..(start + PAGE_SIZE).min(self.total)
    }

    /// Apply a navigation command; moves past either end are no-ops.
    /// Returns false when the caller should stop paging.
    pub fn apply(&mut self, command: PageCommand) -> bool {
        match command {
            PageCommand::Next => {
                if self.bounds().end < self.total {
                    self.page += 1;
                }
                true
            }
            PageCommand::Previous => {
                self.page = self.page.saturating_sub(1);
                true
            }
            PageCommand::Quit => false,
        }
    }
}

/// A rendered-ready table over any [`Tabular`] result set.
pub struct TableView {
    columns: &'static [Column],
    rows: Vec<Vec<Option<String>>>,
}

impl TableView {
    pub fn of<T: Tabular>(items: &[T]) -> Self {
        Self {
            columns: T::columns(),
            rows: items.iter().map(Tabular::row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn pager(&self) -> Pager {
        Pager::new(self.rows.len())
    }

    /// Render the pager's current page as fixed-width text.
    ///
    /// Rows shorter than the column template are diagnosed and skipped
    /// rather than truncating the render mid-line. Cell values longer than
    /// their column are cut to fit.
    pub fn render_page(&self, pager: &Pager) -> String {
        let mut out = String::new();

        for column in self.columns {
            out.push_str(&pad(column.header, column.width));
        }
        out.push('\n');
        let total_width: usize = self.columns.iter().map(|c| c.width).sum();
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for index in pager.bounds() {
            let row = &self.rows[index];
            if row.len() < self.columns.len() {
                tracing::warn!(row = index, "row has incomplete data, skipping");
                continue;
            }
            for (cell, column) in row.iter().zip(self.columns) {
                let value = cell.as_deref().unwrap_or("");
                out.push_str(&pad(value, column.width));
            }
            out.push('\n');
        }

        out.push_str(&format!("\nPage {} of {}\n", pager.page() + 1, pager.page_count()));
        out
    }
}

fn pad(value: &str, width: usize) -> String {
    let cut: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{:<width$}", cut, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NumberRow(usize);

    impl Tabular for NumberRow {
        fn columns() -> &'static [Column] {
            const COLUMNS: &[Column] = &[col("N", 6), col("Label", 12)];
            COLUMNS
        }

        fn row(&self) -> Vec<Option<String>> {
            vec![Some(self.0.to_string()), Some(format!("row-{}", self.0))]
        }
    }

    fn twelve_rows() -> Vec<NumberRow> {
        (1..=12).map(NumberRow).collect()
    }

    #[test]
    fn pager_walks_twelve_rows_in_three_pages() {
        let mut pager = Pager::new(12);
        assert_eq!(pager.bounds(), 0..5);

        assert!(pager.apply(PageCommand::Next));
        assert_eq!(pager.bounds(), 5..10);

        assert!(pager.apply(PageCommand::Next));
        assert_eq!(pager.bounds(), 10..12);

        // Past the last page: no-op.
        assert!(pager.apply(PageCommand::Next));
        assert_eq!(pager.bounds(), 10..12);

        assert_eq!(pager.page_count(), 3);
    }

    #[test]
    fn previous_at_first_page_is_a_noop() {
        let mut pager = Pager::new(12);
        assert!(pager.apply(PageCommand::Previous));
        assert_eq!(pager.bounds(), 0..5);
    }

    #[test]
    fn quit_stops_paging() {
        let mut pager = Pager::new(12);
        assert!(!pager.apply(PageCommand::Quit));
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(PageCommand::parse("N"), Some(PageCommand::Next));
        assert_eq!(PageCommand::parse("next"), Some(PageCommand::Next));
        assert_eq!(PageCommand::parse(" p "), Some(PageCommand::Previous));
        assert_eq!(PageCommand::parse("QUIT"), Some(PageCommand::Quit));
        assert_eq!(PageCommand::parse("x"), None);
    }

    #[test]
    fn renders_only_the_current_page() {
        let rows = twelve_rows();
        let view = TableView::of(&rows);
        let mut pager = view.pager();
        pager.apply(PageCommand::Next);
        pager.apply(PageCommand::Next);

        let rendered = view.render_page(&pager);
        assert!(rendered.contains("row-11"));
        assert!(rendered.contains("row-12"));
        assert!(!rendered.contains("row-5"));
        assert!(rendered.contains("Page 3 of 3"));
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let mut view = TableView::of(&twelve_rows()[..2]);
        view.rows[0] = vec![Some("1".to_string())]; // one cell short

        let rendered = view.render_page(&view.pager());
        assert!(!rendered.contains("row-1 "));
        assert!(rendered.contains("row-2"));
    }

    #[test]
    fn absent_cells_render_empty() {
        let mut view = TableView::of(&twelve_rows()[..1]);
        view.rows[0][1] = None;

        let rendered = view.render_page(&view.pager());
        assert!(!rendered.contains("NULL"));
    }

    #[test]
    fn long_values_are_cut_to_the_column() {
        let view = TableView {
            columns: NumberRow::columns(),
            rows: vec![vec![
                Some("123456789".to_string()),
                Some("a-very-long-label-indeed".to_string()),
            ]],
        };
        let rendered = view.render_page(&Pager::new(1));
        assert!(rendered.contains("12345"));
        assert!(!rendered.contains("123456"));
    }
}
