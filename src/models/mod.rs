//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;

// Re-export commonly used types
pub use author::{Author, AuthorOrder};
pub use book::{Book, BookQuery};
pub use book_instance::{BookInstance, InstanceOrder, LoanStatus};
pub use genre::Genre;
pub use language::Language;
