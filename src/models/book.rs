//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::genre::Genre;

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    // Loaded separately via the book_genres junction
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Book {
    /// Comma-joined genre names, as shown in listing columns
    pub fn display_genres(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1 to 1000 characters"))]
    pub summary: String,
    /// 13-character ISBN. Uniqueness is exact-match; no format rules beyond
    /// the length bound.
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// Update book request. Absent fields are left unchanged; the reference
/// fields distinguish "unchanged" from an explicit null. When `genre_ids`
/// is present it replaces the whole genre set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1 to 1000 characters"))]
    pub summary: Option<String>,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub author_id: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub language_id: Option<Option<i64>>,
    pub genre_ids: Option<Vec<i64>>,
}

/// Search filters for the book listing
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    /// Substring match on the title
    pub title: Option<String>,
    /// Exact ISBN match
    pub isbn: Option<String>,
    pub author_id: Option<i64>,
    pub genre_id: Option<i64>,
}
