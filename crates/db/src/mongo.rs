//! MongoDB-backed book store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    options::{ClientOptions, FindOptions, ReturnDocument},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};

use shelf_kernel::settings::DatabaseSettings;

use crate::{
    error::{StoreError, StoreResult},
    model::{Book, BookChanges, BookFilter, BookPatch, NewBook, Pagination},
    store::BookStore,
};

const APP_NAME: &str = "shelf";

/// Stored shape of a book. Field names follow the existing collection
/// layout (`_id`, `createdAt`, `updatedAt`).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(default)]
    read: bool,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<BsonDateTime>,
}

impl BookDocument {
    fn from_new(book: NewBook) -> StoreResult<Self> {
        let now = Utc::now();
        let validated = book.into_book(String::new(), now)?;
        let stamp = BsonDateTime::from_millis(now.timestamp_millis());

        Ok(Self {
            id: ObjectId::new(),
            title: validated.title,
            author: validated.author,
            genre: validated.genre,
            read: validated.read,
            created_at: Some(stamp),
            updated_at: Some(stamp),
        })
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id.to_hex(),
            title: document.title,
            author: document.author,
            genre: document.genre,
            read: document.read,
            created_at: to_chrono(document.created_at),
            updated_at: to_chrono(document.updated_at),
        }
    }
}

fn to_chrono(stamp: Option<BsonDateTime>) -> DateTime<Utc> {
    stamp
        .and_then(|stamp| DateTime::<Utc>::from_timestamp_millis(stamp.timestamp_millis()))
        .unwrap_or_default()
}

/// Translates a [`BookFilter`] into a MongoDB query document.
pub(crate) fn filter_document(filter: &BookFilter) -> Document {
    let mut query = Document::new();

    if let Some(genre) = &filter.genre {
        query.insert("genre", genre.as_str());
    }
    if let Some(author) = &filter.author {
        query.insert("author", author.as_str());
    }
    if let Some(title) = &filter.title {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(title), "$options": "i" },
        );
    }

    query
}

/// Builds the `$set` update for a patch, stamping `updatedAt`. A cleared
/// genre becomes an `$unset`.
pub(crate) fn update_document(patch: &BookPatch, now: BsonDateTime) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();

    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(author) = &patch.author {
        set.insert("author", author.as_str());
    }
    match &patch.genre {
        Some(Some(genre)) => {
            set.insert("genre", genre.as_str());
        }
        Some(None) => {
            unset.insert("genre", "");
        }
        None => {}
    }
    if let Some(read) = patch.read {
        set.insert("read", read);
    }
    set.insert("updatedAt", now);

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// Book store over a single MongoDB collection. Cloning shares the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<BookDocument>,
}

impl MongoStore {
    /// Connects using `settings.uri`. The database named in the URI wins over
    /// `settings.name`.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options)
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&settings.name));
        let collection = database.collection::<BookDocument>(&settings.collection);

        tracing::info!(
            database = %database.name(),
            collection = %settings.collection,
            "mongodb client configured"
        );

        Ok(Self {
            client,
            database,
            collection,
        })
    }

    fn parse_id(id: &str) -> Option<ObjectId> {
        ObjectId::parse_str(id).ok()
    }
}

#[async_trait]
impl BookStore for MongoStore {
    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let document = BookDocument::from_new(book)?;
        self.collection.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>> {
        let documents = books
            .into_iter()
            .map(BookDocument::from_new)
            .collect::<StoreResult<Vec<_>>>()?;
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        self.collection.insert_many(&documents).await?;
        Ok(documents.into_iter().map(Book::from).collect())
    }

    async fn find_many(
        &self,
        filter: &BookFilter,
        pagination: Pagination,
    ) -> StoreResult<Vec<Book>> {
        let mut options = FindOptions::default();
        options.limit = Some(i64::try_from(pagination.limit).unwrap_or(i64::MAX));
        // The server takes skip as a signed 64-bit value.
        options.skip = Some(pagination.skip.min(i64::MAX.unsigned_abs()));

        Ok(self
            .collection
            .find(filter_document(filter))
            .with_options(options)
            .await?
            .try_collect::<Vec<BookDocument>>()
            .await?
            .into_iter()
            .map(Book::from)
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let Some(object_id) = Self::parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .collection
            .find_one(doc! { "_id": object_id })
            .await?
            .map(Book::from))
    }

    async fn update_by_id(&self, id: &str, changes: BookChanges) -> StoreResult<Option<Book>> {
        let patch = changes.to_patch();
        patch.validate()?;

        let Some(object_id) = Self::parse_id(id) else {
            return Ok(None);
        };

        tracing::debug!(book_id = %object_id, mode = changes.mode(), "updating book");

        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": object_id },
                update_document(&patch, BsonDateTime::now()),
            )
            .return_document(ReturnDocument::After)
            .await?
            .map(Book::from))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let Some(object_id) = Self::parse_id(id) else {
            return Ok(None);
        };

        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": object_id })
            .await?
            .map(Book::from))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}
