//! Router builder for the shelf HTTP server

use axum::{http::StatusCode, routing::get, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use shelf_kernel::ModuleRegistry;

use crate::{response::module_path, MakeRequestUuidV7};

const OPENAPI_TITLE: &str = "Shelf API";
const OPENAPI_VERSION: &str = "1.0.0";

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&module_path(module_name), module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Generate `x-request-id` when absent and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(timeout_ms),
            ));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merged_openapi(registry);

        // Deserialize the merged JSON into a utoipa OpenApi object for SwaggerUI
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "merged OpenAPI document rejected; serving stub");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title(OPENAPI_TITLE)
                            .version(OPENAPI_VERSION)
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw merged document for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Base document plus every custom module's fragment, with module paths
/// prefixed by their mount point
pub fn merged_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": OPENAPI_TITLE,
            "version": OPENAPI_VERSION,
            "description": "Book catalogue REST API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["Link"] = serde_json::json!({
        "type": "object",
        "properties": {
            "rel": { "type": "string" },
            "href": { "type": "string" },
            "method": { "type": "string" }
        },
        "required": ["rel", "href", "method"]
    });

    openapi_spec["components"]["schemas"]["ApiResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "message": { "type": "string" },
            "count": { "type": "integer" },
            "data": {
                "oneOf": [
                    { "type": "object" },
                    { "type": "array", "items": { "type": "object" } }
                ]
            },
            "links": {
                "type": "array",
                "items": { "$ref": "#/components/schemas/Link" }
            },
            "errors": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["success"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.custom_modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = format!("{}{}", module_path(module.name()), path);
                let prefixed_path = prefixed_path.trim_end_matches('/').to_string();
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}
