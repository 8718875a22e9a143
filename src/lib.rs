//! Library Catalog Store
//!
//! A persistent catalog of books, authors, genres, languages and physical
//! book copies, backed by SQLite through sqlx. Management front-ends consume
//! the repository layer; there is no web surface in this crate.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;

pub use config::AppConfig;
pub use error::{CatalogError, CatalogResult};
pub use repository::Repository;
