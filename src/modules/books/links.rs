//! Hypermedia links for book responses.

use axum::http::{header::HOST, HeaderMap, Method};
use shelf_http::{module_path, Link};

use super::MODULE_NAME;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

/// `scheme://host` the client used to reach us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let scheme = header_text(headers, FORWARDED_PROTO)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SCHEME);
        let host = header_text(headers, HOST.as_str())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_HOST);

        Self(format!("{}://{}", scheme, host))
    }

    pub fn collection(&self) -> String {
        format!("{}{}", self.0, module_path(MODULE_NAME))
    }

    pub fn record(&self, book_id: &str) -> String {
        format!("{}/{}", self.collection(), book_id)
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// `self`, `update` and `delete` for one book.
pub fn record_links(base: &BaseUrl, book_id: &str) -> Vec<Link> {
    let href = base.record(book_id);
    vec![
        Link::new("self", href.clone(), Method::GET),
        Link::new("update", href.clone(), Method::PUT),
        Link::new("delete", href, Method::DELETE),
    ]
}

/// `create` for the collection.
pub fn collection_links(base: &BaseUrl) -> Vec<Link> {
    vec![Link::new("create", base.collection(), Method::POST)]
}
