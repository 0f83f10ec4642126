//! The persistence contract the HTTP layer relies on.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::StoreResult,
    model::{Book, BookChanges, BookFilter, NewBook, Pagination},
};

/// A collection of book records.
///
/// Lookups by id return `Ok(None)` when no record matches, including when
/// the id is not well-formed for the backend.
#[async_trait]
pub trait BookStore: Send + Sync + Debug {
    /// Stores a new book and returns it with its assigned id.
    async fn insert(&self, book: NewBook) -> StoreResult<Book>;

    /// Stores several books in order.
    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>>;

    /// Returns the matching books in natural (insertion) order.
    async fn find_many(&self, filter: &BookFilter, pagination: Pagination)
        -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Applies `changes` and returns the record as it is after the write.
    async fn update_by_id(&self, id: &str, changes: BookChanges) -> StoreResult<Option<Book>>;

    /// Removes the record and returns what was removed.
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Round-trip to the backend to prove it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Releases backend resources. The store must not be used afterwards.
    async fn shutdown(&self) -> StoreResult<()>;
}

/// The store handle shared by every request.
pub type SharedStore = Arc<dyn BookStore>;
