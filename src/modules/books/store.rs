//! Data access for the `books` table.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use super::models::{Book, BookInput};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// One statement per operation. Absence of a row is reported through
/// `Option`/`bool`, never as an error.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Book>, StoreError>;

    /// Insert a row and return the input under the generated id.
    async fn create(&self, input: &BookInput) -> Result<Book, StoreError>;

    /// Replace every mutable field of row `id`; `None` when no such row.
    async fn update(&self, id: i32, input: &BookInput) -> Result<Option<Book>, StoreError>;

    /// `false` when no row matched.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

pub(crate) const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    author VARCHAR(255) NOT NULL,
    published_date VARCHAR(20),
    isbn VARCHAR(20),
    price DECIMAL(10, 2)
)
"#;

// `price` is NUMERIC on disk and FLOAT8 on the wire; NULL text columns read as ''.
const LIST_BOOKS: &str = r#"
SELECT id, title, author,
       COALESCE(published_date, '') AS published_date,
       COALESCE(isbn, '') AS isbn,
       COALESCE(price, 0)::FLOAT8 AS price
FROM books
"#;

const GET_BOOK: &str = r#"
SELECT id, title, author,
       COALESCE(published_date, '') AS published_date,
       COALESCE(isbn, '') AS isbn,
       COALESCE(price, 0)::FLOAT8 AS price
FROM books
WHERE id = $1
"#;

// Only the id comes back: the created book echoes the submitted fields.
const INSERT_BOOK: &str = r#"
INSERT INTO books (title, author, published_date, isbn, price)
VALUES ($1, $2, $3, $4, $5)
RETURNING id
"#;

const UPDATE_BOOK: &str = r#"
UPDATE books
SET title = $1, author = $2, published_date = $3, isbn = $4, price = $5
WHERE id = $6
RETURNING id, title, author,
          COALESCE(published_date, '') AS published_date,
          COALESCE(isbn, '') AS isbn,
          COALESCE(price, 0)::FLOAT8 AS price
"#;

const DELETE_BOOK: &str = "DELETE FROM books WHERE id = $1";

#[derive(Debug, FromRow)]
struct BookRow {
    id: i32,
    title: String,
    author: String,
    published_date: String,
    isbn: String,
    price: f64,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            published_date: row.published_date,
            isbn: row.isbn,
            price: row.price,
            created_at: None,
            updated_at: None,
        }
    }
}

/// [`BookStore`] over the shared PostgreSQL pool.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(LIST_BOOKS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(GET_BOOK)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn create(&self, input: &BookInput) -> Result<Book, StoreError> {
        let id: i32 = sqlx::query_scalar(INSERT_BOOK)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.published_date)
            .bind(&input.isbn)
            .bind(input.price)
            .fetch_one(&self.pool)
            .await?;
        Ok(input.clone().into_book(id))
    }

    async fn update(&self, id: i32, input: &BookInput) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(UPDATE_BOOK)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.published_date)
            .bind(&input.isbn)
            .bind(input.price)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(DELETE_BOOK)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
