pub mod handlers;
pub mod links;
pub mod models;
pub mod routes;
pub mod seed;
pub mod validation;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use shelf_db::SharedStore;
use shelf_kernel::{InitCtx, Module};

use handlers::BooksState;

/// Name the module is registered and mounted under.
pub const MODULE_NAME: &str = "books";

/// The book resource: CRUD over the shared store.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self {
            state: BooksState::new(store),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn envelope(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ApiResponse" }
            }
        }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn book_id_param() -> Value {
    json!({
        "name": "bookId",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn text_query_param(name: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "schema": { "type": "string", "minLength": 2, "maxLength": 50 }
    })
}

fn openapi_fragment() -> Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "parameters": [
                        text_query_param("genre"),
                        text_query_param("author"),
                        text_query_param("title"),
                        { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "default": 10 } },
                        { "name": "page", "in": "query", "required": false, "schema": { "type": "integer", "default": 1 } }
                    ],
                    "responses": {
                        "200": envelope("Page of books with hypermedia links"),
                        "400": envelope("Validation failed or books could not be fetched")
                    }
                },
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": json_body("CreateBook"),
                    "responses": {
                        "201": envelope("Book added"),
                        "400": envelope("Title or author missing"),
                        "500": envelope("Internal server error")
                    }
                }
            },
            "/{bookId}": {
                "parameters": [book_id_param()],
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "responses": {
                        "200": envelope("The book"),
                        "404": envelope("Book not found"),
                        "500": envelope("Internal server error")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "requestBody": json_body("UpdateBook"),
                    "responses": {
                        "200": envelope("Updated book"),
                        "400": envelope("Title or author missing"),
                        "404": envelope("Book not found"),
                        "500": envelope("Internal server error")
                    }
                },
                "patch": {
                    "summary": "Patch a book",
                    "tags": ["Books"],
                    "requestBody": json_body("PatchBook"),
                    "responses": {
                        "200": envelope("Updated book"),
                        "400": envelope("No fields supplied"),
                        "404": envelope("Book not found"),
                        "500": envelope("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "responses": {
                        "200": envelope("Book deleted"),
                        "404": envelope("Book not found"),
                        "500": envelope("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "_id": { "type": "string", "description": "Store-assigned identifier" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "genre": { "type": "string" },
                        "read": { "type": "boolean", "default": false }
                    },
                    "required": ["_id", "title", "author", "read"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "genre": { "type": "string" },
                        "read": { "type": "boolean" }
                    },
                    "required": ["title", "author"]
                },
                "UpdateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "genre": { "type": "string" }
                    },
                    "required": ["title", "author"]
                },
                "PatchBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "genre": { "type": "string" },
                        "read": { "type": "boolean" }
                    },
                    "minProperties": 1
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(store: SharedStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
