//! Process bootstrap: open the store, boot modules, serve, tear down.

use std::sync::Arc;

use anyhow::Context;
use shelf_db::{DatabaseModule, SharedStore};
use shelf_kernel::{InitCtx, ModuleRegistry, Settings};

use crate::modules::{self, books::seed::sample_books};

/// Registry with the database as the only core module and every custom
/// module sharing `store`.
pub fn build_registry(store: SharedStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(DatabaseModule::new(store.clone())));
    modules::register_all(&mut registry, store);
    registry
}

/// Serve until a shutdown signal arrives. Modules are stopped even when
/// the server fails.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "shelf-app bootstrap starting"
    );

    let store = shelf_db::connect(&settings.database)
        .await
        .context("failed to open book store")?;
    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.boot(&ctx).await?;
    tracing::info!("shelf-app bootstrap complete");

    let served = shelf_http::start_server(&registry, &settings).await;
    let stopped = registry.shutdown().await;

    served?;
    stopped
}

/// Insert the sample books and return how many were written.
pub async fn seed(settings: &Settings) -> anyhow::Result<usize> {
    let store = shelf_db::connect(&settings.database)
        .await
        .context("failed to open book store")?;

    let inserted = store.insert_many(sample_books()).await;
    store.shutdown().await.context("failed to close book store")?;

    let books = inserted.context("failed to insert sample books")?;
    for book in &books {
        tracing::info!(book_id = %book.id, title = %book.title, "seeded book");
    }
    Ok(books.len())
}
