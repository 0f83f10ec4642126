//! One handler per CRUD operation. Each validates its input, makes a single
//! store call and shapes the envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use shelf_db::{Book, SharedStore};
use shelf_http::{error::VALIDATION_FAILED, ApiResponse, AppError};

use super::{
    links::{collection_links, record_links, BaseUrl},
    models::{
        BookWithLinks, CreateBookRequest, ListBooksQuery, PatchBookRequest, UpdateBookRequest,
    },
    validation,
};

const LIST_FAILED: &str = "Error while fetching books.";
const NOT_FOUND: &str = "Book not found. Please check the ID";

/// Shared by every books handler.
#[derive(Debug, Clone)]
pub struct BooksState {
    pub store: SharedStore,
}

impl BooksState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

/// A request without a JSON content type is treated as an empty object.
fn json_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// `GET /books`
///
/// Store failures surface as 400 here, unlike the other handlers.
pub async fn get_books(
    State(state): State<BooksState>,
    headers: HeaderMap,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<BookWithLinks>>>, AppError> {
    let Query(query) = query?;
    validation::validate_list_query(&query)
        .map_err(|errors| AppError::validation(errors, VALIDATION_FAILED))?;

    let filter = validation::build_filter(&query);
    let pagination = validation::pagination(&query);

    let books = state
        .store
        .find_many(&filter, pagination)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, ?filter, "failed to list books");
            AppError::bad_request(LIST_FAILED)
        })?;

    let base = BaseUrl::from_headers(&headers);
    let data: Vec<BookWithLinks> = books
        .into_iter()
        .map(|book| BookWithLinks {
            links: record_links(&base, &book.id),
            book,
        })
        .collect();

    Ok(Json(
        ApiResponse::success()
            .with_count(data.len())
            .with_data(data)
            .with_links(collection_links(&base)),
    ))
}

/// `GET /books/{bookId}`
pub async fn get_book_by_id(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
) -> Result<Json<ApiResponse<Book>>, AppError> {
    let book = state
        .store
        .find_by_id(&book_id)
        .await
        .map_err(|err| AppError::internal("An error occurred while fetching the book.", err))?
        .ok_or_else(|| AppError::not_found(format!("Book with id of {} not found", book_id)))?;

    Ok(Json(ApiResponse::success().with_data(book)))
}

/// `POST /books`
pub async fn add_book(
    State(state): State<BooksState>,
    body: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Book>>), AppError> {
    let new_book = validation::new_book(json_or_default(body)?)?;

    let book = state
        .store
        .insert(new_book)
        .await
        .map_err(|err| AppError::internal("An error occurred while adding the book", err))?;

    tracing::info!(book_id = %book.id, "book added");

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success()
                .with_message("Book Added!")
                .with_data(book),
        ),
    ))
}

/// `PUT /books/{bookId}`
pub async fn update_book(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
    body: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Book>>, AppError> {
    let changes = validation::replacement(json_or_default(body)?)?;

    let book = state
        .store
        .update_by_id(&book_id, changes)
        .await
        .map_err(|err| AppError::internal("An error occurred while updating the book", err))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    tracing::info!(book_id = %book.id, "book replaced");

    Ok(Json(
        ApiResponse::success()
            .with_message("Book updated successfully")
            .with_data(book),
    ))
}

/// `PATCH /books/{bookId}`
pub async fn patch_book(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
    body: Result<Json<PatchBookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Book>>, AppError> {
    let changes = validation::patch(json_or_default(body)?)?;

    let book = state
        .store
        .update_by_id(&book_id, changes)
        .await
        .map_err(|err| AppError::internal("An error occurred while updating a book", err))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    tracing::info!(book_id = %book.id, "book patched");

    Ok(Json(
        ApiResponse::success()
            .with_message("Book updated successfully")
            .with_data(book),
    ))
}

/// `DELETE /books/{bookId}`
pub async fn delete_book(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state
        .store
        .delete_by_id(&book_id)
        .await
        .map_err(|err| AppError::internal("An error occurred while deleting a book", err))?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    tracing::info!(book_id = %book_id, "book deleted");

    Ok(Json(ApiResponse::success().with_message(format!(
        "Book with ID {} deleted successfully",
        book_id
    ))))
}
