//! Books repository

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::{CatalogError, CatalogResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        genre::Genre,
    },
};

const SELECT_BOOK: &str = "SELECT id, title, summary, isbn, author_id, language_id FROM books";

#[derive(Clone)]
pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all books by title, with genres loaded
    pub async fn list(&self) -> CatalogResult<Vec<Book>> {
        let mut books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY title", SELECT_BOOK))
            .fetch_all(&self.pool)
            .await?;
        for book in &mut books {
            book.genres = self.get_book_genres(book.id).await?;
        }
        Ok(books)
    }

    /// Search books with optional filters, by title
    pub async fn search(&self, query: &BookQuery) -> CatalogResult<Vec<Book>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("{} WHERE 1=1", SELECT_BOOK));

        if let Some(ref title) = query.title {
            builder.push(" AND title LIKE ");
            builder.push_bind(format!("%{}%", title));
        }
        if let Some(ref isbn) = query.isbn {
            builder.push(" AND isbn = ");
            builder.push_bind(isbn.clone());
        }
        if let Some(author_id) = query.author_id {
            builder.push(" AND author_id = ");
            builder.push_bind(author_id);
        }
        if let Some(genre_id) = query.genre_id {
            builder.push(" AND id IN (SELECT book_id FROM book_genres WHERE genre_id = ");
            builder.push_bind(genre_id);
            builder.push(")");
        }
        builder.push(" ORDER BY title");

        let mut books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        for book in &mut books {
            book.genres = self.get_book_genres(book.id).await?;
        }
        Ok(books)
    }

    /// Get book by ID, with genres loaded
    pub async fn get_by_id(&self, id: i64) -> CatalogResult<Book> {
        let mut book = sqlx::query_as::<_, Book>(&format!("{} WHERE id = $1", SELECT_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Book {} not found", id)))?;
        book.genres = self.get_book_genres(id).await?;
        Ok(book)
    }

    /// Get book by exact ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> CatalogResult<Book> {
        let mut book = sqlx::query_as::<_, Book>(&format!("{} WHERE isbn = $1", SELECT_BOOK))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Book with ISBN {} not found", isbn)))?;
        book.genres = self.get_book_genres(book.id).await?;
        Ok(book)
    }

    /// Create a book with its genre associations
    pub async fn create(&self, data: &CreateBook) -> CatalogResult<Book> {
        data.validate()?;
        self.ensure_isbn_free(&data.isbn, None).await?;
        self.ensure_references(data.author_id, data.language_id, Some(&data.genre_ids))
            .await?;

        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, summary, isbn, author_id, language_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, summary, isbn, author_id, language_id",
        )
        .bind(data.title.trim())
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.author_id)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await?;

        for genre_id in &data.genre_ids {
            sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(book.id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        book.genres = self.get_book_genres(book.id).await?;
        Ok(book)
    }

    /// Update a book, re-validating length and uniqueness constraints. When
    /// `genre_ids` is present the whole genre set is replaced.
    pub async fn update(&self, id: i64, data: &UpdateBook) -> CatalogResult<Book> {
        data.validate()?;
        let current = self.get_by_id(id).await?;

        let title = data.title.clone().unwrap_or(current.title);
        let summary = data.summary.clone().unwrap_or(current.summary);
        let isbn = data.isbn.clone().unwrap_or(current.isbn);
        let author_id = match data.author_id {
            Some(value) => value,
            None => current.author_id,
        };
        let language_id = match data.language_id {
            Some(value) => value,
            None => current.language_id,
        };

        self.ensure_isbn_free(&isbn, Some(id)).await?;
        self.ensure_references(author_id, language_id, data.genre_ids.as_deref())
            .await?;

        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>(
            "UPDATE books
             SET title = $1, summary = $2, isbn = $3, author_id = $4, language_id = $5
             WHERE id = $6
             RETURNING id, title, summary, isbn, author_id, language_id",
        )
        .bind(title.trim())
        .bind(&summary)
        .bind(&isbn)
        .bind(author_id)
        .bind(language_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("Book {} not found", id)))?;

        if let Some(ref genre_ids) = data.genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for genre_id in genre_ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        book.genres = self.get_book_genres(id).await?;
        Ok(book)
    }

    /// Delete a book along with its genre association rows. Refused while
    /// any book instance references it.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.get_by_id(id).await?;

        let copies: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if copies > 0 {
            return Err(CatalogError::Integrity(
                "cannot delete: referenced by other records".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Load genres for a book via the book_genres junction table
    async fn get_book_genres(&self, book_id: i64) -> CatalogResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name
             FROM book_genres bg
             JOIN genres g ON g.id = bg.genre_id
             WHERE bg.book_id = $1
             ORDER BY g.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Exact-match duplicate check on the ISBN
    async fn ensure_isbn_free(&self, isbn: &str, exclude_id: Option<i64>) -> CatalogResult<()> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM books WHERE isbn = $1 AND id != $2")
                .bind(isbn)
                .bind(exclude_id.unwrap_or(0))
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(CatalogError::Validation(
                "A book with this ISBN already exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Verify that referenced authors, languages and genres exist before a write
    async fn ensure_references(
        &self,
        author_id: Option<i64>,
        language_id: Option<i64>,
        genre_ids: Option<&[i64]>,
    ) -> CatalogResult<()> {
        if let Some(author_id) = author_id {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE id = $1")
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(CatalogError::Validation(format!(
                    "Author {} does not exist",
                    author_id
                )));
            }
        }
        if let Some(language_id) = language_id {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM languages WHERE id = $1")
                .bind(language_id)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(CatalogError::Validation(format!(
                    "Language {} does not exist",
                    language_id
                )));
            }
        }
        if let Some(genre_ids) = genre_ids {
            for &genre_id in genre_ids {
                let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = $1")
                    .bind(genre_id)
                    .fetch_optional(&self.pool)
                    .await?;
                if exists.is_none() {
                    return Err(CatalogError::Validation(format!(
                        "Genre {} does not exist",
                        genre_id
                    )));
                }
            }
        }
        Ok(())
    }
}
