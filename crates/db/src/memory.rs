//! Process-local book store.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::{
    error::StoreResult,
    model::{Book, BookChanges, BookFilter, NewBook, Pagination},
    store::BookStore,
};

/// Keeps books in insertion order behind an async lock. Ids are generated
/// the same way the MongoDB backend generates them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let book = book.into_book(ObjectId::new().to_hex(), Utc::now())?;
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>> {
        let now = Utc::now();
        let created = books
            .into_iter()
            .map(|book| book.into_book(ObjectId::new().to_hex(), now))
            .collect::<StoreResult<Vec<_>>>()?;

        self.books.write().await.extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_many(
        &self,
        filter: &BookFilter,
        pagination: Pagination,
    ) -> StoreResult<Vec<Book>> {
        let skip = usize::try_from(pagination.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);

        Ok(self
            .books
            .read()
            .await
            .iter()
            .filter(|book| filter.matches(book))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        Ok(self
            .books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned())
    }

    async fn update_by_id(&self, id: &str, changes: BookChanges) -> StoreResult<Option<Book>> {
        let patch = changes.to_patch();
        patch.validate()?;

        let mut books = self.books.write().await;
        let Some(stored) = books.iter_mut().find(|book| book.id == id) else {
            return Ok(None);
        };

        let mut updated = stored.clone();
        updated.apply(&patch);
        updated.validate()?;
        updated.updated_at = Utc::now();
        *stored = updated.clone();

        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let mut books = self.books.write().await;
        Ok(books
            .iter()
            .position(|book| book.id == id)
            .map(|index| books.remove(index)))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        let remaining = self.books.read().await.len();
        tracing::debug!(books = remaining, "memory store shut down");
        Ok(())
    }
}
