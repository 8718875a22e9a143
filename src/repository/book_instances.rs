//! Book instances repository

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{CatalogError, CatalogResult},
    models::book_instance::{
        BookInstance, CreateBookInstance, InstanceOrder, LoanStatus, UpdateBookInstance,
    },
};

/// Every read joins the linked book so display labels never need a second
/// lookup. The join is LEFT: a copy may have no book.
const SELECT_INSTANCE: &str = "SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, \
     b.title AS book_title \
     FROM book_instances bi LEFT JOIN books b ON b.id = bi.book_id";

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: SqlitePool,
}

impl BookInstancesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all copies in the default order: due date ascending, copies with
    /// no due date first (SQLite sorts NULL before any value).
    pub async fn list(&self) -> CatalogResult<Vec<BookInstance>> {
        self.list_ordered(InstanceOrder::default()).await
    }

    /// List all copies in an explicitly requested order
    pub async fn list_ordered(&self, order: InstanceOrder) -> CatalogResult<Vec<BookInstance>> {
        let query = format!("{} ORDER BY bi.{}", SELECT_INSTANCE, order.as_sql());
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List the copies of one book
    pub async fn list_for_book(&self, book_id: i64) -> CatalogResult<Vec<BookInstance>> {
        let query = format!("{} WHERE bi.book_id = $1 ORDER BY bi.due_back", SELECT_INSTANCE);
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List copies with a given status
    pub async fn list_by_status(&self, status: LoanStatus) -> CatalogResult<Vec<BookInstance>> {
        let query = format!("{} WHERE bi.status = $1 ORDER BY bi.due_back", SELECT_INSTANCE);
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", SELECT_INSTANCE);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Create a copy. Status defaults to Maintenance when absent.
    pub async fn create(&self, data: &CreateBookInstance) -> CatalogResult<BookInstance> {
        data.validate()?;
        if let Some(book_id) = data.book_id {
            self.ensure_book_exists(book_id).await?;
        }
        let status = data.status.unwrap_or_default();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO book_instances (book_id, imprint, due_back, status)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(data.book_id)
        .bind(data.imprint.trim())
        .bind(data.due_back)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a copy. Any status may replace any other; `book_id` and
    /// `due_back` can be cleared with an explicit null.
    pub async fn update(&self, id: i64, data: &UpdateBookInstance) -> CatalogResult<BookInstance> {
        data.validate()?;
        let current = self.get_by_id(id).await?;

        let book_id = match data.book_id {
            Some(value) => value,
            None => current.book_id,
        };
        if let Some(Some(new_book_id)) = data.book_id {
            self.ensure_book_exists(new_book_id).await?;
        }
        let imprint = data.imprint.clone().unwrap_or(current.imprint);
        let due_back = match data.due_back {
            Some(value) => value,
            None => current.due_back,
        };
        let status = data.status.unwrap_or(current.status);

        sqlx::query(
            "UPDATE book_instances
             SET book_id = $1, imprint = $2, due_back = $3, status = $4
             WHERE id = $5",
        )
        .bind(book_id)
        .bind(imprint.trim())
        .bind(due_back)
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Delete a copy. Nothing references copies, so this always succeeds for
    /// an existing row.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!(
                "Book instance {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn ensure_book_exists(&self, book_id: i64) -> CatalogResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(CatalogError::Validation(format!(
                "Book {} does not exist",
                book_id
            )));
        }
        Ok(())
    }
}
