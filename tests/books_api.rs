use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shelf_app::build_registry;
use shelf_db::{
    Book, BookChanges, BookFilter, BookStore, MemoryStore, NewBook, Pagination, SharedStore,
    StoreError, StoreResult,
};
use shelf_kernel::Settings;

fn app(store: SharedStore) -> Router {
    let registry = build_registry(store);
    shelf_http::build_router(&registry, &Settings::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn seeded(books: Vec<NewBook>) -> (Arc<MemoryStore>, Router) {
    let store = Arc::new(MemoryStore::new());
    store.insert_many(books).await.unwrap();
    let router = app(store.clone());
    (store, router)
}

fn sample() -> Vec<NewBook> {
    vec![
        NewBook::new("Book One", "Author A")
            .with_genre("Fiction")
            .with_read(true),
        NewBook::new("Book Two", "Author B")
            .with_genre("Non-Fiction")
            .with_read(true),
    ]
}

#[tokio::test]
async fn added_book_is_retrievable_and_unread_by_default() {
    let (_, app) = seeded(Vec::new()).await;

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/books",
            json!({"title": "Dune", "author": "Frank Herbert"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book Added!");
    assert_eq!(body["data"]["read"], false);

    let id = body["data"]["_id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, get(&format!("/api/books/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Dune");
    assert_eq!(body["data"]["author"], "Frank Herbert");
    assert_eq!(body["data"]["read"], false);
}

#[tokio::test]
async fn add_without_author_is_rejected() {
    let (store, app) = seeded(Vec::new()).await;

    let (status, body) = send(
        &app,
        with_json("POST", "/api/books", json!({"title": "Dune"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Please provide title and author"})
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn add_without_body_is_rejected() {
    let (_, app) = seeded(Vec::new()).await;

    let (status, body) = send(
        &app,
        Request::post("/api/books").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide title and author");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (_, app) = seeded(Vec::new()).await;

    let request = Request::post("/api/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn delete_missing_then_existing() {
    let (store, app) = seeded(sample()).await;

    let (status, body) = send(&app, delete("/api/books/000000000000000000000000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Book not found. Please check the ID"})
    );

    let id = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[0]
        .id
        .clone();
    let (status, body) = send(&app, delete(&format!("/api/books/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Book with ID {} deleted successfully", id)
    );

    let (status, _) = send(&app, get(&format!("/api/books/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let (_, app) = seeded(sample()).await;

    for id in ["000000000000000000000000", "not-an-id"] {
        let (status, body) = send(&app, get(&format!("/api/books/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Book with id of {} not found", id));
    }
}

#[tokio::test]
async fn genre_filter_matches_exactly() {
    let (_, app) = seeded(sample()).await;

    let (status, body) = send(&app, get("/api/books?genre=Fiction")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "Book One");
}

#[tokio::test]
async fn title_filter_is_case_insensitive_substring() {
    let (_, app) = seeded(vec![
        NewBook::new("The Great Gatsby", "F. Scott Fitzgerald"),
        NewBook::new("Moby Dick", "Herman Melville"),
    ])
    .await;

    let (status, body) = send(&app, get("/api/books?title=great")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["title"], "The Great Gatsby");
}

#[tokio::test]
async fn list_defaults_to_ten_and_pages() {
    let books = (1..=12)
        .map(|n| NewBook::new(format!("Volume {n}"), "Serial Author"))
        .collect();
    let (_, app) = seeded(books).await;

    let (_, body) = send(&app, get("/api/books")).await;
    assert_eq!(body["count"], 10);
    assert_eq!(body["data"][0]["title"], "Volume 1");

    let (_, body) = send(&app, get("/api/books?limit=5&page=3")).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["title"], "Volume 11");

    let (_, body) = send(&app, get("/api/books?limit=abc&page=0")).await;
    assert_eq!(body["count"], 10);
}

#[tokio::test]
async fn page_beyond_integer_range_is_empty() {
    let (_, app) = seeded(vec![NewBook::new("Only Book", "Sole Author")]).await;

    let (status, body) = send(
        &app,
        get("/api/books?page=99999999999999999999&limit=3"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn list_reports_every_validation_error() {
    let (_, app) = seeded(sample()).await;

    let long = "z".repeat(51);
    let (status, body) = send(&app, get(&format!("/api/books?genre=F&title={long}"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed!");
    assert_eq!(
        body["errors"],
        json!([
            "Genre must have at least 2 characters",
            "Title must not exceed 50 characters"
        ])
    );
}

#[tokio::test]
async fn list_links_follow_host_header() {
    let (_, app) = seeded(sample()).await;

    let request = Request::get("/api/books?genre=Fiction")
        .header(header::HOST, "books.example.com:8080")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;

    let id = body["data"][0]["_id"].as_str().unwrap();
    let record = format!("http://books.example.com:8080/api/books/{id}");
    assert_eq!(
        body["data"][0]["links"],
        json!([
            {"rel": "self", "href": record, "method": "GET"},
            {"rel": "update", "href": record, "method": "PUT"},
            {"rel": "delete", "href": record, "method": "DELETE"},
        ])
    );
    assert_eq!(
        body["links"],
        json!([{"rel": "create", "href": "http://books.example.com:8080/api/books", "method": "POST"}])
    );
}

#[tokio::test]
async fn empty_patch_is_rejected_for_any_id() {
    let (store, app) = seeded(sample()).await;
    let id = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[0]
        .id
        .clone();

    for target in [id.as_str(), "000000000000000000000000"] {
        let (status, body) = send(
            &app,
            with_json("PATCH", &format!("/api/books/{target}"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please provide at least one field to update");
    }
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let (store, app) = seeded(sample()).await;
    let id = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[0]
        .id
        .clone();

    let (status, body) = send(
        &app,
        with_json(
            "PATCH",
            &format!("/api/books/{id}"),
            json!({"read": false, "shelf": "ignored"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["data"]["read"], false);
    assert_eq!(body["data"]["title"], "Book One");
    assert_eq!(body["data"]["genre"], "Fiction");
}

#[tokio::test]
async fn patch_with_null_genre_clears_it() {
    let (store, app) = seeded(sample()).await;
    let id = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[0]
        .id
        .clone();

    let (status, body) = send(
        &app,
        with_json("PATCH", &format!("/api/books/{id}"), json!({"genre": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert!(body["data"].get("genre").is_none());
    assert_eq!(body["data"]["title"], "Book One");

    let stored = store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.genre, None);
}

#[tokio::test]
async fn patch_missing_book_is_not_found() {
    let (_, app) = seeded(sample()).await;

    let (status, body) = send(
        &app,
        with_json(
            "PATCH",
            "/api/books/000000000000000000000000",
            json!({"read": true}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found. Please check the ID");
}

#[tokio::test]
async fn update_without_author_leaves_record_unchanged() {
    let (store, app) = seeded(sample()).await;
    let before = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[0]
        .clone();

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/books/{}", before.id),
            json!({"title": "Renamed"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide title, author");

    let after = store.find_by_id(&before.id).await.unwrap().unwrap();
    assert_eq!(after.title, before.title);
    assert_eq!(after.author, before.author);
}

#[tokio::test]
async fn update_replaces_title_and_author() {
    let (store, app) = seeded(sample()).await;
    let id = store
        .find_many(&BookFilter::default(), Pagination::default())
        .await
        .unwrap()[1]
        .id
        .clone();

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/books/{id}"),
            json!({"title": "Book Two, Revised", "author": "Author C"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Book Two, Revised");
    assert_eq!(body["data"]["author"], "Author C");
    assert_eq!(body["data"]["genre"], "Non-Fiction");
}

#[tokio::test]
async fn update_missing_book_is_not_found() {
    let (store, app) = seeded(sample()).await;

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            "/api/books/000000000000000000000000",
            json!({"title": "Ghost", "author": "Nobody"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Book not found. Please check the ID"})
    );
    assert_eq!(store.len().await, 2);
}

/// Every call fails, as a store whose backend went away would.
#[derive(Debug)]
struct UnreachableStore;

fn refused<T>() -> StoreResult<T> {
    Err(StoreError::Backend("connection refused".to_string()))
}

#[async_trait]
impl BookStore for UnreachableStore {
    async fn insert(&self, _book: NewBook) -> StoreResult<Book> {
        refused()
    }

    async fn insert_many(&self, _books: Vec<NewBook>) -> StoreResult<Vec<Book>> {
        refused()
    }

    async fn find_many(
        &self,
        _filter: &BookFilter,
        _pagination: Pagination,
    ) -> StoreResult<Vec<Book>> {
        refused()
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        refused()
    }

    async fn update_by_id(&self, _id: &str, _changes: BookChanges) -> StoreResult<Option<Book>> {
        refused()
    }

    async fn delete_by_id(&self, _id: &str) -> StoreResult<Option<Book>> {
        refused()
    }

    async fn ping(&self) -> StoreResult<()> {
        refused()
    }

    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn store_failures_map_to_status_codes() {
    let app = app(Arc::new(UnreachableStore));
    let id = "000000000000000000000000";

    let (status, body) = send(&app, get("/api/books")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error while fetching books.");

    let (status, body) = send(&app, get(&format!("/api/books/{id}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("connection refused"));

    let (status, _) = send(
        &app,
        with_json("POST", "/api/books", json!({"title": "T", "author": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/books/{id}"),
            json!({"title": "T", "author": "A"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An error occurred while updating the book");

    let (status, _) = send(
        &app,
        with_json("PATCH", &format!("/api/books/{id}"), json!({"read": true})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, delete(&format!("/api/books/{id}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn booting_against_unreachable_store_fails_on_db() {
    let registry = build_registry(Arc::new(UnreachableStore));
    let settings = Settings::default();
    let ctx = shelf_kernel::InitCtx {
        settings: &settings,
    };

    let err = registry.boot(&ctx).await.unwrap_err();
    assert!(err.to_string().contains("failed to initialize core module 'db'"));
}

#[tokio::test]
async fn openapi_documents_books_paths() {
    let (_, app) = seeded(Vec::new()).await;

    let (status, body) = send(&app, get("/docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/books").is_some());
    assert!(body["paths"].get("/api/books/{bookId}").is_some());
}

#[test]
fn merged_openapi_is_a_valid_document() {
    let registry = build_registry(Arc::new(MemoryStore::new()));
    let document = shelf_http::router::merged_openapi(&registry);

    let parsed = serde_json::from_value::<utoipa::openapi::OpenApi>(document);
    assert!(parsed.is_ok(), "{:?}", parsed.err());
}
