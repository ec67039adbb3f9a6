mod support;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::{app, sample_book, send, send_raw, MemoryBookStore, UnavailableBookStore};

#[tokio::test]
async fn list_on_empty_table_is_an_empty_array() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::GET, "/books", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn create_echoes_input_with_assigned_id() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::POST, "/books", Some(sample_book())).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let book = response.book();
    assert_ne!(book.id, 0);
    assert_eq!(book.title, "Test Book");
    assert_eq!(book.author, "Test Author");
    assert_eq!(book.published_date, "2023-01-01");
    assert_eq!(book.isbn, "1234567890");
    assert_eq!(book.price, 19.99);

    let body = response.json();
    assert!(body["created_at"].is_null());
    assert!(body["updated_at"].is_null());
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let created = send(&app, Method::POST, "/books", Some(sample_book()))
        .await
        .book();
    let response = send(&app, Method::GET, &format!("/books/{}", created.id), None).await;

    assert_eq!(response.status, StatusCode::OK);
    let fetched = response.book();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, "Test Book");

    let listed = send(&app, Method::GET, "/books", None).await.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn create_title_length_boundary() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let mut at_limit = sample_book();
    at_limit["title"] = json!("t".repeat(255));
    let response = send(&app, Method::POST, "/books", Some(at_limit)).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let mut too_long = sample_book();
    too_long["title"] = json!("t".repeat(256));
    let response = send(&app, Method::POST, "/books", Some(too_long)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "title cannot exceed 255 characters");
    assert_eq!(body["error"]["details"][0]["field"], "title");
}

#[tokio::test]
async fn create_price_boundary() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let mut negative = sample_book();
    negative["price"] = json!(-0.01);
    let response = send(&app, Method::POST, "/books", Some(negative)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "price cannot be negative");

    let mut free = sample_book();
    free["price"] = json!(0);
    let response = send(&app, Method::POST, "/books", Some(free)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.book().price, 0.0);
}

#[tokio::test]
async fn create_requires_title_and_author() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::POST, "/books", Some(json!({"author": "Someone"}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "title is required");

    let blank_author = json!({"title": "Something", "author": "  "});
    let response = send(&app, Method::POST, "/books", Some(blank_author)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "author is required");
}

#[tokio::test]
async fn create_rejects_type_mismatch_before_validation() {
    let store = Arc::new(MemoryBookStore::default());
    let app = app(store.clone());

    let response = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": 123, "author": "Invalid Author"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "bad_request");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn create_rejects_malformed_json() {
    let store = Arc::new(MemoryBookStore::default());
    let app = app(store.clone());

    let response = send_raw(&app, Method::POST, "/books", "{\"title\": \"Dune\",").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "bad_request");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::GET, "/books/9999", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"]["code"], "not_found");
}

#[tokio::test]
async fn update_replaces_fields() {
    let app = app(Arc::new(MemoryBookStore::default()));
    let created = send(&app, Method::POST, "/books", Some(sample_book()))
        .await
        .book();

    let mut changes = sample_book();
    changes["title"] = json!("Updated Book Title");
    changes["price"] = json!(25.99);
    let response = send(
        &app,
        Method::PUT,
        &format!("/books/{}", created.id),
        Some(changes),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let updated = response.book();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Updated Book Title");
    assert_eq!(updated.price, 25.99);
    assert_eq!(updated.author, created.author);
    assert_eq!(updated.isbn, created.isbn);
    assert_eq!(updated.published_date, created.published_date);

    let fetched = send(&app, Method::GET, &format!("/books/{}", created.id), None)
        .await
        .book();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_unknown_id_is_not_found_and_mutates_nothing() {
    let app = app(Arc::new(MemoryBookStore::default()));
    let created = send(&app, Method::POST, "/books", Some(sample_book()))
        .await
        .book();

    let mut changes = sample_book();
    changes["title"] = json!("Updated Book Title");
    let response = send(&app, Method::PUT, "/books/9999", Some(changes)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let listed = send(&app, Method::GET, "/books", None).await.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["title"], created.title);
}

#[tokio::test]
async fn update_validates_like_create() {
    let store = Arc::new(MemoryBookStore::default());
    let app = app(store.clone());
    let created = send(&app, Method::POST, "/books", Some(sample_book()))
        .await
        .book();

    let mut changes = sample_book();
    changes["author"] = json!("a".repeat(256));
    let response = send(
        &app,
        Method::PUT,
        &format!("/books/{}", created.id),
        Some(changes),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"]["message"],
        "author cannot exceed 255 characters"
    );
    // Only the create reached storage.
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app(Arc::new(MemoryBookStore::default()));
    let created = send(&app, Method::POST, "/books", Some(sample_book()))
        .await
        .book();
    let uri = format!("/books/{}", created.id);

    let response = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());

    let response = send(&app, Method::GET, &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::DELETE, "/books/9999", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_never_reaches_storage() {
    let store = Arc::new(MemoryBookStore::default());
    let app = app(store.clone());

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(sample_book())),
        (Method::DELETE, None),
    ] {
        let response = send(&app, method.clone(), "/books/abc", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(response.json()["error"]["message"], "invalid book id");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn out_of_range_id_is_not_found_without_storage() {
    let store = Arc::new(MemoryBookStore::default());
    let app = app(store.clone());

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(sample_book())),
        (Method::DELETE, None),
    ] {
        let response = send(&app, method.clone(), "/books/99999999999", body).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method}");
        let body = response.json();
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "book 99999999999 not found");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn bad_id_wins_over_bad_body_on_update() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send_raw(&app, Method::PUT, "/books/abc", "not json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "invalid book id");
}

#[tokio::test]
async fn storage_failures_are_internal_errors() {
    let app = app(Arc::new(UnavailableBookStore));

    let requests = [
        (Method::GET, "/books", None),
        (Method::GET, "/books/1", None),
        (Method::POST, "/books", Some(sample_book())),
        (Method::PUT, "/books/1", Some(sample_book())),
        (Method::DELETE, "/books/1", None),
    ];

    for (method, uri, body) in requests {
        let response = send(&app, method.clone(), uri, body).await;
        assert_eq!(
            response.status,
            StatusCode::INTERNAL_SERVER_ERROR,
            "{method} {uri}"
        );
        let body = response.json();
        assert_eq!(body["error"]["code"], "internal_error");
        assert!(!body["error"]["message"].as_str().unwrap_or_default().is_empty());
    }
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"ok");

    let response = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    assert!(document["paths"]["/books"]["post"].is_object());
    assert!(document["paths"]["/books/{id}"]["delete"].is_object());
    assert!(document["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn unmatched_routes_fall_through() {
    let app = app(Arc::new(MemoryBookStore::default()));

    let response = send(&app, Method::GET, "/authors", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, Method::PATCH, "/books/1", Some(sample_book())).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
