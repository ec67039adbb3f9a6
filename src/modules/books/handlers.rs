use std::{fmt::Display, num::IntErrorKind, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bookstore_http::error::AppError;
use serde_json::json;

use super::models::{Book, BookInput, ValidationError};
use super::store::{BookStore, StoreError};

/// State shared by every books handler.
#[derive(Clone)]
pub(crate) struct BooksState {
    pub(crate) store: Arc<dyn BookStore>,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(
            vec![json!({"field": err.field(), "error": err.to_string()})],
            err.to_string(),
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// `None` for integers outside the `SERIAL` range: no row can carry them.
fn parse_book_id(raw: &str) -> Result<Option<i32>, AppError> {
    match raw.parse::<i32>() {
        Ok(id) => Ok(Some(id)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Ok(None)
        }
        Err(_) => {
            tracing::debug!(raw_id = raw, "rejected malformed book id");
            Err(AppError::bad_request("invalid book id"))
        }
    }
}

/// Strict decode: malformed JSON and type mismatches are client errors.
fn decode_input(body: &[u8]) -> Result<BookInput, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("invalid request body: {}", e)))
}

fn book_not_found(id: impl Display) -> AppError {
    AppError::not_found(format!("book {} not found", id))
}

/// `GET /books`
pub(crate) async fn list_books(
    State(state): State<BooksState>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state.store.list().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(books))
}

/// `GET /books/{id}`
pub(crate) async fn get_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let Some(id) = parse_book_id(&raw_id)? else {
        return Err(book_not_found(raw_id));
    };

    match state.store.get(id).await? {
        Some(book) => Ok(Json(book)),
        None => Err(book_not_found(id)),
    }
}

/// `POST /books`
pub(crate) async fn create_book(
    State(state): State<BooksState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let input = decode_input(&body)?;
    input.validate()?;

    let book = state.store.create(&input).await?;
    tracing::info!(book_id = book.id, "book created");

    Ok((StatusCode::CREATED, Json(book)))
}

/// `PUT /books/{id}`
///
/// The id is checked before the body is decoded.
pub(crate) async fn update_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Book>, AppError> {
    let Some(id) = parse_book_id(&raw_id)? else {
        return Err(book_not_found(raw_id));
    };
    let input = decode_input(&body)?;
    input.validate()?;

    match state.store.update(id, &input).await? {
        Some(book) => {
            tracing::info!(book_id = book.id, "book updated");
            Ok(Json(book))
        }
        None => Err(book_not_found(id)),
    }
}

/// `DELETE /books/{id}`
pub(crate) async fn delete_book(
    State(state): State<BooksState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let Some(id) = parse_book_id(&raw_id)? else {
        return Err(book_not_found(raw_id));
    };

    if !state.store.delete(id).await? {
        return Err(book_not_found(id));
    }

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
