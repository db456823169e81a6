//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod members;
pub mod policy;

use sqlx::{Pool, Postgres};

/// Escape LIKE metacharacters so search text always matches literally.
/// Paired with an explicit `ESCAPE '\'` clause in the queries.
pub(crate) fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
    pub policy: policy::PolicyRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            policy: policy::PolicyRepository::new(pool.clone()),
            pool,
        }
    }
}
