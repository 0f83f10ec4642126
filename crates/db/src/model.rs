//! Book records and the parameter types the store understands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Opaque store-assigned identifier (a 24-character hex ObjectId).
pub type BookId = String;

/// A stored book.
///
/// Timestamps are maintained by the store and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub read: bool,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Schema check applied before every write.
    pub(crate) fn validate(&self) -> StoreResult<()> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)
    }

    pub(crate) fn apply(&mut self, patch: &BookPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(genre) = &patch.genre {
            self.genre = genre.clone();
        }
        if let Some(read) = patch.read {
            self.read = read;
        }
    }
}

fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidDocument(format!(
            "Path `{}` is required.",
            field
        )));
    }
    Ok(())
}

/// Fields accepted when creating a book. `read` defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub read: Option<bool>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: None,
            read: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = Some(read);
        self
    }

    pub(crate) fn into_book(self, id: BookId, now: DateTime<Utc>) -> StoreResult<Book> {
        let book = Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            read: self.read.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        book.validate()?;
        Ok(book)
    }
}

/// Constraints for a list query. `None` means no constraint on that field.
///
/// `genre` and `author` match exactly; `title` matches any stored title that
/// contains it, ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(genre) = &self.genre {
            if book.genre.as_deref() != Some(genre.as_str()) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if &book.author != author {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !book.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Window over a list query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of records returned
    pub limit: u64,
    /// Number of matching records skipped first
    pub skip: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub const fn new(limit: u64, skip: u64) -> Self {
        Self { limit, skip }
    }

    /// Window for a 1-indexed page of `limit` records.
    pub const fn page(page: u64, limit: u64) -> Self {
        Self {
            limit,
            skip: page.saturating_sub(1).saturating_mul(limit),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::page(1, Self::DEFAULT_LIMIT)
    }
}

/// Subset of book fields to overwrite.
///
/// `genre: Some(None)` clears the stored genre; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<Option<String>>,
    pub read: Option<bool>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.genre.is_none() && self.read.is_none()
    }

    /// Rejects a patch that would blank out a required field.
    pub(crate) fn validate(&self) -> StoreResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        Ok(())
    }
}

/// Replacement of the required fields. An absent `genre` leaves the stored
/// genre untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReplacement {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
}

/// How an update-by-id call changes a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookChanges {
    Replace(BookReplacement),
    Partial(BookPatch),
}

impl BookChanges {
    /// The concrete field writes this change performs.
    pub fn to_patch(&self) -> BookPatch {
        match self {
            BookChanges::Replace(replacement) => BookPatch {
                title: Some(replacement.title.clone()),
                author: Some(replacement.author.clone()),
                genre: replacement.genre.clone().map(Some),
                read: None,
            },
            BookChanges::Partial(patch) => patch.clone(),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            BookChanges::Replace(_) => "replace",
            BookChanges::Partial(_) => "partial",
        }
    }
}
