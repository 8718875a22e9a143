//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Loan status of a physical copy. Stored and serialized as the
/// single-letter legacy code (m/o/a/r).
///
/// There are no transition rules: any status may replace any other, and
/// `due_back` may be set or cleared in any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    #[sqlx(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    #[sqlx(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    #[sqlx(rename = "a")]
    Available,
    #[serde(rename = "r")]
    #[sqlx(rename = "r")]
    Reserved,
}

impl LoanStatus {
    /// Return the single-letter code stored in the database
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On Loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    /// Parse a stored code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(LoanStatus::Maintenance),
            "o" => Some(LoanStatus::OnLoan),
            "a" => Some(LoanStatus::Available),
            "r" => Some(LoanStatus::Reserved),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Full book instance model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookInstance {
    pub id: i64,
    pub book_id: Option<i64>,
    pub imprint: String,
    /// Only meaningful while the copy is on loan
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    // Populated by the LEFT JOIN in repository reads; None when no book is linked
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
}

impl std::fmt::Display for BookInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.book_title.as_deref() {
            Some(title) => write!(f, "{} ({})", self.id, title),
            None => write!(f, "{} (no book)", self.id),
        }
    }
}

/// Create book instance request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookInstance {
    pub book_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Defaults to Maintenance when absent
    pub status: Option<LoanStatus>,
}

/// Update book instance request. Absent fields are left unchanged; `book_id`
/// and `due_back` distinguish "unchanged" from an explicit null.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBookInstance {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub book_id: Option<Option<i64>>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub due_back: Option<Option<NaiveDate>>,
    pub status: Option<LoanStatus>,
}

/// Orderings accepted by the book instance listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceOrder {
    /// Due date ascending, copies with no due date first (the catalog default)
    #[default]
    DueBack,
    Status,
    Imprint,
    Id,
}

impl InstanceOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            InstanceOrder::DueBack => "due_back",
            InstanceOrder::Status => "status",
            InstanceOrder::Imprint => "imprint",
            InstanceOrder::Id => "id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(LoanStatus::from_code(status.as_code()), Some(status));
        }
        assert_eq!(LoanStatus::from_code("x"), None);
    }

    #[test]
    fn default_status_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::default().as_code(), "m");
    }

    #[test]
    fn labels_match_legacy_wording() {
        assert_eq!(LoanStatus::Maintenance.label(), "Maintenance");
        assert_eq!(LoanStatus::OnLoan.label(), "On Loan");
        assert_eq!(LoanStatus::Available.label(), "Available");
        assert_eq!(LoanStatus::Reserved.label(), "Reserved");
    }

    #[test]
    fn display_label_falls_back_when_unlinked() {
        let mut copy = BookInstance {
            id: 7,
            book_id: None,
            imprint: "First edition".to_string(),
            due_back: None,
            status: LoanStatus::Maintenance,
            book_title: None,
        };
        assert_eq!(copy.to_string(), "7 (no book)");

        copy.book_title = Some("Dune".to_string());
        assert_eq!(copy.to_string(), "7 (Dune)");
    }
}
