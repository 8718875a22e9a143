//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Create author request.
///
/// The date pair is deliberately unvalidated: a date of death earlier than
/// the date of birth is accepted.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request. Absent fields are left unchanged; the date fields
/// distinguish "unchanged" from an explicit null.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub date_of_death: Option<Option<NaiveDate>>,
}

/// Orderings accepted by the author listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorOrder {
    /// Last name then first name, ascending (the catalog default)
    #[default]
    Name,
    DateOfBirth,
    Id,
}

impl AuthorOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            AuthorOrder::Name => "last_name, first_name",
            AuthorOrder::DateOfBirth => "date_of_birth",
            AuthorOrder::Id => "id",
        }
    }
}
