//! Catalog service: book CRUD, search and bulk import

use std::io::Read;
use std::str::FromStr;

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Availability, Book, CreateBook, UpdateBook},
        import::{ImportReport, RecordOutcome, SkipReason},
    },
    repository::Repository,
};

/// Number of fields in a bulk import record:
/// title, author, category, publisher, isbn, edition, year, price,
/// shelf, language, available.
const IMPORT_FIELDS: usize = 11;

/// Validate one import record and map it to a create request.
///
/// Pure so it can be tested without a store; uniqueness is checked by the
/// caller against current state.
fn parse_import_record(record: &csv::StringRecord) -> Result<CreateBook, SkipReason> {
    if record.len() < IMPORT_FIELDS {
        return Err(SkipReason::Malformed {
            fields: record.len(),
        });
    }

    let field = |i: usize| record.get(i).unwrap_or("").trim().trim_matches('"').to_string();

    let title = field(0);
    let authors = field(1);
    let isbn = field(4);
    if title.is_empty() || authors.is_empty() || isbn.is_empty() {
        return Err(SkipReason::MissingRequired);
    }

    let year_raw = field(6);
    let year: i32 = year_raw
        .parse()
        .map_err(|_| SkipReason::InvalidYear(year_raw.clone()))?;

    let price_raw = field(7);
    let price = Decimal::from_str(&price_raw)
        .map_err(|_| SkipReason::InvalidPrice(price_raw.clone()))?;

    let availability_raw = field(10);
    let availability = Availability::from_str(&availability_raw)
        .map_err(|_| SkipReason::InvalidAvailability(availability_raw.clone()))?;

    let optional = |s: String| if s.is_empty() { None } else { Some(s) };

    Ok(CreateBook {
        title,
        authors,
        genre: optional(field(2)),
        publisher: optional(field(3)),
        isbn,
        edition: optional(field(5)),
        published_year: Some(year),
        price: Some(price),
        rack_location: optional(field(8)),
        language: optional(field(9)),
        availability,
    })
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog, returning its id.
    pub async fn add_book(&self, book: CreateBook) -> AppResult<i32> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "ISBN '{}' already exists",
                book.isbn
            )));
        }

        self.repository.books.create(&book).await
    }

    /// Update only the supplied fields of a book.
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        if update.is_empty() {
            return Err(AppError::Validation("No changes provided".to_string()));
        }
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // NotFound before any uniqueness diagnostics.
        self.repository.books.get_by_id(id).await?;

        if let Some(ref isbn) = update.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(format!("ISBN '{}' already exists", isbn)));
            }
        }

        self.repository.books.update(id, &update).await?;
        self.repository.books.get_by_id(id).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// All books ordered by id.
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Substring search over title and authors.
    pub async fn search_books(&self, text: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search(text).await
    }

    /// Bulk import books from comma-separated records.
    ///
    /// Streaming, best-effort: each record is validated independently and
    /// malformed, duplicate or rejected records are reported and skipped,
    /// never aborting the run. Quoted fields (doubled quotes) are handled
    /// by the csv reader; blank lines are ignored.
    pub async fn bulk_import<R: Read>(&self, reader: R) -> AppResult<ImportReport> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut report = ImportReport::default();

        let mut records = csv_reader.records();
        loop {
            let line = records.reader().position().line();
            let Some(result) = records.next() else {
                break;
            };

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(line, error = %e, "unreadable import record");
                    report.push(line, RecordOutcome::Skipped(SkipReason::Unreadable(e.to_string())));
                    continue;
                }
            };

            let book = match parse_import_record(&record) {
                Ok(book) => book,
                Err(reason) => {
                    tracing::warn!(line, %reason, "skipping import record");
                    report.push(line, RecordOutcome::Skipped(reason));
                    continue;
                }
            };

            if self.repository.books.isbn_exists(&book.isbn, None).await? {
                let reason = SkipReason::DuplicateIsbn(book.isbn.clone());
                tracing::warn!(line, %reason, "skipping import record");
                report.push(line, RecordOutcome::Skipped(reason));
                continue;
            }

            match self.repository.books.create(&book).await {
                Ok(id) => report.push(line, RecordOutcome::Added(id)),
                Err(AppError::Database(e)) => {
                    // A bad record must not abort the rest of the file.
                    tracing::warn!(line, error = %e, "store rejected import record");
                    report.push(line, RecordOutcome::Skipped(SkipReason::Store(e.to_string())));
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(added = report.added, skipped = report.skipped(), "bulk import finished");
        Ok(report)
    }
}
