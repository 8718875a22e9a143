//! Genres repository

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{CatalogError, CatalogResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: SqlitePool,
}

impl GenresRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all genres, alphabetically
    pub async fn list(&self) -> CatalogResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Genre {} not found", id)))
    }

    /// Create a genre. Names are unique ignoring case.
    pub async fn create(&self, data: &CreateGenre) -> CatalogResult<Genre> {
        data.validate()?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "Genre name cannot be empty".to_string(),
            ));
        }
        self.ensure_name_free(name, None).await?;

        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a genre, re-validating the uniqueness constraint
    pub async fn update(&self, id: i64, data: &UpdateGenre) -> CatalogResult<Genre> {
        data.validate()?;
        let current = self.get_by_id(id).await?;

        let name = match data.name.as_deref() {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CatalogError::Validation(
                        "Genre name cannot be empty".to_string(),
                    ));
                }
                name.to_string()
            }
            None => current.name,
        };
        self.ensure_name_free(&name, Some(id)).await?;

        let row = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Genre {} not found", id)))?;
        Ok(row)
    }

    /// Delete a genre along with its book association rows. Books themselves
    /// are never removed here.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_genres WHERE genre_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("Genre {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Duplicate check against the lowered name projection
    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> CatalogResult<()> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM genres WHERE lower(name) = lower($1) AND id != $2",
        )
        .bind(name)
        .bind(exclude_id.unwrap_or(0))
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(CatalogError::Validation(
                "Genre already exists (case insensitive match)".to_string(),
            ));
        }
        Ok(())
    }
}
