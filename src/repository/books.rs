//! Books repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check whether an ISBN is already taken, optionally excluding one book.
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new book, returning its id.
    ///
    /// Caller validates the request first; the unique index on isbn is the
    /// final arbiter against concurrent inserts.
    pub async fn create(&self, book: &CreateBook) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books
                (title, authors, genre, publisher, isbn, edition,
                 published_year, price, rack_location, language, availability)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.genre)
        .bind(&book.publisher)
        .bind(&book.isbn)
        .bind(&book.edition)
        .bind(book.published_year)
        .bind(book.price)
        .bind(&book.rack_location)
        .bind(&book.language)
        .bind(book.availability)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Apply a partial update. Only supplied fields are written.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<()> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE books SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(ref title) = update.title {
                fields.push("title = ").push_bind_unseparated(title);
            }
            if let Some(ref authors) = update.authors {
                fields.push("authors = ").push_bind_unseparated(authors);
            }
            if let Some(ref genre) = update.genre {
                fields.push("genre = ").push_bind_unseparated(genre);
            }
            if let Some(ref publisher) = update.publisher {
                fields.push("publisher = ").push_bind_unseparated(publisher);
            }
            if let Some(ref isbn) = update.isbn {
                fields.push("isbn = ").push_bind_unseparated(isbn);
            }
            if let Some(ref edition) = update.edition {
                fields.push("edition = ").push_bind_unseparated(edition);
            }
            if let Some(year) = update.published_year {
                fields.push("published_year = ").push_bind_unseparated(year);
            }
            if let Some(price) = update.price {
                fields.push("price = ").push_bind_unseparated(price);
            }
            if let Some(ref rack) = update.rack_location {
                fields.push("rack_location = ").push_bind_unseparated(rack);
            }
            if let Some(ref language) = update.language {
                fields.push("language = ").push_bind_unseparated(language);
            }
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a book by id.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// All books, ordered by id.
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Substring search over title and authors. The search text is matched
    /// literally; case sensitivity follows the store collation.
    pub async fn search(&self, text: &str) -> AppResult<Vec<Book>> {
        let pattern = format!("%{}%", super::escape_like(text));
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books \
             WHERE title LIKE $1 ESCAPE '\\' OR authors LIKE $1 ESCAPE '\\' \
             ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}
