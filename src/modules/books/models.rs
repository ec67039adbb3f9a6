use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Upper bound on `title` and `author`, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Server-generated primary key
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Free-form, not parsed as a date
    pub published_date: String,
    pub isbn: String,
    pub price: f64,
    /// Not populated by any handler; always `null` on the wire.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    /// Not populated by any handler; always `null` on the wire.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Request body for create and update.
///
/// Missing fields decode to their zero value and are then caught by
/// [`BookInput::validate`]; unknown fields such as `id` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: String,
    pub price: f64,
}

/// Reason a [`BookInput`] was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("author is required")]
    AuthorRequired,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("title cannot exceed 255 characters")]
    TitleTooLong,
    #[error("author cannot exceed 255 characters")]
    AuthorTooLong,
}

impl ValidationError {
    /// Name of the offending JSON field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TitleRequired | ValidationError::TitleTooLong => "title",
            ValidationError::AuthorRequired | ValidationError::AuthorTooLong => "author",
            ValidationError::NegativePrice => "price",
        }
    }
}

impl BookInput {
    /// The book as submitted, under the id storage assigned to it.
    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            published_date: self.published_date,
            isbn: self.isbn,
            price: self.price,
            created_at: None,
            updated_at: None,
        }
    }

    /// Check the write rules in order; the first failing rule is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::AuthorRequired);
        }
        if self.price < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        if self.title.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TitleTooLong);
        }
        if self.author.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::AuthorTooLong);
        }
        Ok(())
    }
}
