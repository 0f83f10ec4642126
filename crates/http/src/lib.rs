//! HTTP server facade for shelf: Axum router assembly, the JSON response
//! envelope, error mapping, and the serve loop.

use std::future::Future;

use anyhow::Context;
use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::{Timestamp, Uuid};

use shelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod response;
pub mod router;

pub use error::AppError;
pub use response::{module_path, ApiResponse, Link};
use router::RouterBuilder;

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, settings);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to address {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    serve(listener, app, shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all custom module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.custom_modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under {}",
            module_path(module_name)
        );
        router_builder = router_builder.mount_module(module_name, module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        },
    }
}

/// Time-ordered request ids for tracing
#[derive(Clone, Copy)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
