//! Authors repository

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{CatalogError, CatalogResult},
    models::author::{Author, AuthorOrder, CreateAuthor, UpdateAuthor},
};

const SELECT_AUTHOR: &str =
    "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors";

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: SqlitePool,
}

impl AuthorsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all authors in the default order (last name, then first name)
    pub async fn list(&self) -> CatalogResult<Vec<Author>> {
        self.list_ordered(AuthorOrder::default()).await
    }

    /// List all authors in an explicitly requested order
    pub async fn list_ordered(&self, order: AuthorOrder) -> CatalogResult<Vec<Author>> {
        let query = format!("{} ORDER BY {}", SELECT_AUTHOR, order.as_sql());
        let rows = sqlx::query_as::<_, Author>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Author> {
        sqlx::query_as::<_, Author>(&format!("{} WHERE id = $1", SELECT_AUTHOR))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Author {} not found", id)))
    }

    /// Create an author
    pub async fn create(&self, data: &CreateAuthor) -> CatalogResult<Author> {
        data.validate()?;

        let row = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
             VALUES ($1, $2, $3, $4)
             RETURNING id, first_name, last_name, date_of_birth, date_of_death",
        )
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update an author. Absent fields keep their current value; the date
    /// fields can be cleared with an explicit null.
    pub async fn update(&self, id: i64, data: &UpdateAuthor) -> CatalogResult<Author> {
        data.validate()?;
        let current = self.get_by_id(id).await?;

        let first_name = data.first_name.clone().unwrap_or(current.first_name);
        let last_name = data.last_name.clone().unwrap_or(current.last_name);
        let date_of_birth = match data.date_of_birth {
            Some(value) => value,
            None => current.date_of_birth,
        };
        let date_of_death = match data.date_of_death {
            Some(value) => value,
            None => current.date_of_death,
        };

        let row = sqlx::query_as::<_, Author>(
            "UPDATE authors
             SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
             WHERE id = $5
             RETURNING id, first_name, last_name, date_of_birth, date_of_death",
        )
        .bind(first_name.trim())
        .bind(last_name.trim())
        .bind(date_of_birth)
        .bind(date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Author {} not found", id)))?;
        Ok(row)
    }

    /// Delete an author. Refused while any book references it.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.get_by_id(id).await?;

        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if referencing > 0 {
            return Err(CatalogError::Integrity(
                "cannot delete: referenced by other records".to_string(),
            ));
        }

        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
