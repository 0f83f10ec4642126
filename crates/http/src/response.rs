//! The JSON envelope every API response uses.

use axum::http::Method;
use serde::Serialize;

/// Prefix under which custom modules are mounted.
pub const API_PREFIX: &str = "/api";

/// Path a module's router is nested under, e.g. `/api/books`.
pub fn module_path(module_name: &str) -> String {
    format!("{}/{}", API_PREFIX, module_name)
}

/// Hypermedia link describing a follow-up action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: &'static str,
    pub href: String,
    pub method: String,
}

impl Link {
    pub fn new(rel: &'static str, href: impl Into<String>, method: Method) -> Self {
        Self {
            rel,
            href: href.into(),
            method: method.as_str().to_string(),
        }
    }
}

/// `{success, message?, count?, data?, links?, errors?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success() -> Self {
        Self::with_status(true)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::with_status(false).with_message(message)
    }

    fn with_status(success: bool) -> Self {
        Self {
            success,
            message: None,
            count: None,
            data: None,
            links: None,
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let body = ApiResponse::<()>::failure("Book not found. Please check the ID");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": false, "message": "Book not found. Please check the ID"})
        );
    }

    #[test]
    fn list_envelope_shape() {
        let body = ApiResponse::success()
            .with_count(1)
            .with_data(vec!["x"])
            .with_links(vec![Link::new(
                "create",
                "http://localhost/api/books",
                Method::POST,
            )]);

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "success": true,
                "count": 1,
                "data": ["x"],
                "links": [{"rel": "create", "href": "http://localhost/api/books", "method": "POST"}]
            })
        );
    }

    #[test]
    fn module_path_is_prefixed() {
        assert_eq!(module_path("books"), "/api/books");
    }
}
