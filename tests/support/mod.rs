#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use bookstore_app::modules::books::{
    self,
    models::{Book, BookInput},
    store::{BookStore, StoreError},
};
use bookstore_kernel::ModuleRegistry;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// `BookStore` backed by a map, counting every call that reaches it.
#[derive(Default)]
pub struct MemoryBookStore {
    rows: Mutex<BTreeMap<i32, Book>>,
    next_id: Mutex<i32>,
    calls: AtomicUsize,
}

impl MemoryBookStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        self.touch();
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Book>, StoreError> {
        self.touch();
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn create(&self, input: &BookInput) -> Result<Book, StoreError> {
        self.touch();
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let book = input.clone().into_book(*next_id);
        self.rows.lock().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, input: &BookInput) -> Result<Option<Book>, StoreError> {
        self.touch();
        let mut rows = self.rows.lock().await;
        Ok(rows.get_mut(&id).map(|row| {
            *row = input.clone().into_book(id);
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        self.touch();
        Ok(self.rows.lock().await.remove(&id).is_some())
    }
}

/// `BookStore` whose every call fails like an unreachable server.
pub struct UnavailableBookStore;

#[async_trait]
impl BookStore for UnavailableBookStore {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn get(&self, _id: i32) -> Result<Option<Book>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn create(&self, _input: &BookInput) -> Result<Book, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn update(&self, _id: i32, _input: &BookInput) -> Result<Option<Book>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn delete(&self, _id: i32) -> Result<bool, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/// Full application router over the given store.
pub fn app(store: Arc<dyn BookStore>) -> Router {
    let mut registry = ModuleRegistry::new();
    registry.register_custom(books::create_module(store));
    bookstore_http::build_router(&registry)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn book(&self) -> Book {
        serde_json::from_slice(&self.body).expect("response body is a book")
    }
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: impl Into<Body>,
) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        body: body.to_vec(),
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    send_raw(app, method, uri, body).await
}

pub fn sample_book() -> Value {
    serde_json::json!({
        "title": "Test Book",
        "author": "Test Author",
        "published_date": "2023-01-01",
        "isbn": "1234567890",
        "price": 19.99
    })
}
