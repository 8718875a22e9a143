//! Languages repository

use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{CatalogError, CatalogResult},
    models::language::{CreateLanguage, Language, UpdateLanguage},
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: SqlitePool,
}

impl LanguagesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all languages, alphabetically
    pub async fn list(&self) -> CatalogResult<Vec<Language>> {
        let rows = sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get language by ID
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Language {} not found", id)))
    }

    /// Create a language. Names are unique ignoring case.
    pub async fn create(&self, data: &CreateLanguage) -> CatalogResult<Language> {
        data.validate()?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "Language name cannot be empty".to_string(),
            ));
        }
        self.ensure_name_free(name, None).await?;

        let row = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a language, re-validating the uniqueness constraint
    pub async fn update(&self, id: i64, data: &UpdateLanguage) -> CatalogResult<Language> {
        data.validate()?;
        let current = self.get_by_id(id).await?;

        let name = match data.name.as_deref() {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CatalogError::Validation(
                        "Language name cannot be empty".to_string(),
                    ));
                }
                name.to_string()
            }
            None => current.name,
        };
        self.ensure_name_free(&name, Some(id)).await?;

        let row = sqlx::query_as::<_, Language>(
            "UPDATE languages SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Language {} not found", id)))?;
        Ok(row)
    }

    /// Delete a language. Refused while any book references it.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.get_by_id(id).await?;

        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE language_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if referencing > 0 {
            return Err(CatalogError::Integrity(
                "cannot delete: referenced by other records".to_string(),
            ));
        }

        sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Duplicate check against the lowered name projection
    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> CatalogResult<()> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM languages WHERE lower(name) = lower($1) AND id != $2",
        )
        .bind(name)
        .bind(exclude_id.unwrap_or(0))
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(CatalogError::Validation(
                "Language already exists (case insensitive match)".to_string(),
            ));
        }
        Ok(())
    }
}
