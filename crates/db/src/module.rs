use async_trait::async_trait;
use shelf_kernel::{InitCtx, Module};

use crate::store::SharedStore;

/// Core module owning the process-wide store handle: checks connectivity
/// on init and releases the client on stop.
pub struct DatabaseModule {
    store: SharedStore,
}

impl DatabaseModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.store.ping().await?;
        tracing::info!(
            module = self.name(),
            backend = ?ctx.settings.database.backend,
            "database reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.shutdown().await?;
        tracing::info!(module = self.name(), "database connection closed");
        Ok(())
    }
}
