//! Book model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, FromRow, Postgres};
use std::str::FromStr;
use validator::Validate;

/// Book availability; toggled exclusively by the circulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::Unavailable => "Unavailable",
        }
    }
}

impl FromStr for Availability {
    type Err = String;

    /// Accepts the legacy Yes/No spelling alongside the enum labels,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "available" => Ok(Availability::Available),
            "no" | "unavailable" => Ok(Availability::Unavailable),
            other => Err(format!(
                "availability must be Yes/No or Available/Unavailable, got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// SQLx conversion: stored as TEXT
impl sqlx::Type<Postgres> for Availability {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Availability {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Availability {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub isbn: String,
    pub edition: Option<String>,
    pub published_year: Option<i32>,
    pub price: Option<Decimal>,
    pub rack_location: Option<String>,
    pub language: Option<String>,
    pub availability: Availability,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Authors are required"))]
    pub authors: String,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub edition: Option<String>,
    pub published_year: Option<i32>,
    pub price: Option<Decimal>,
    pub rack_location: Option<String>,
    pub language: Option<String>,
    pub availability: Availability,
}

/// Partial update; only supplied fields are written. Supplied values obey
/// the same constraints as on create, so a blank title or ISBN cannot
/// overwrite a required field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Authors are required"))]
    pub authors: Option<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: Option<String>,
    pub edition: Option<String>,
    pub published_year: Option<i32>,
    pub price: Option<Decimal>,
    pub rack_location: Option<String>,
    pub language: Option<String>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.genre.is_none()
            && self.publisher.is_none()
            && self.isbn.is_none()
            && self.edition.is_none()
            && self.published_year.is_none()
            && self.price.is_none()
            && self.rack_location.is_none()
            && self.language.is_none()
    }
}
