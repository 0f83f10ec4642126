//! Request and response schemas for the books endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use shelf_db::Book;
use shelf_http::Link;

/// Query string accepted by `GET /books`.
///
/// `limit` and `page` stay raw text; anything unparsable falls back to the
/// defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Body of `POST /books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub read: Option<bool>,
}

/// Body of `PUT /books/{bookId}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

/// Body of `PATCH /books/{bookId}`. Unrecognised keys are ignored.
///
/// `"genre": null` is kept apart from an absent key: it clears the genre.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub genre: Option<Option<String>>,
    pub read: Option<bool>,
}

/// Wraps whatever was sent, `null` included, so only a missing key is `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A listed book with its follow-up actions.
#[derive(Debug, Clone, Serialize)]
pub struct BookWithLinks {
    #[serde(flatten)]
    pub book: Book,
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_genre_distinguishes_null_from_absent() {
        let absent: PatchBookRequest = serde_json::from_str(r#"{"read": true}"#).unwrap();
        assert_eq!(absent.genre, None);

        let cleared: PatchBookRequest = serde_json::from_str(r#"{"genre": null}"#).unwrap();
        assert_eq!(cleared.genre, Some(None));

        let set: PatchBookRequest = serde_json::from_str(r#"{"genre": "Poetry"}"#).unwrap();
        assert_eq!(set.genre, Some(Some("Poetry".to_string())));
    }
}
