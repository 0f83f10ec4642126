use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};

/// Core module initialization order (the HTTP server is not a module)
const CORE_MODULE_ORDER: &[&str] = &[
    "db", // Store connection, shared by every custom module
];

/// Lifecycle step applied across a group of modules
#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    Start,
    Stop,
}

impl Phase {
    fn verb(self) -> &'static str {
        match self {
            Phase::Init => "initialize",
            Phase::Start => "start",
            Phase::Stop => "stop",
        }
    }
}

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register a core module with the registry
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register a custom module with the registry
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// Get all registered modules (core + custom)
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    /// Custom modules only; these are the ones that expose HTTP routes
    pub fn custom_modules(&self) -> &[Arc<dyn Module>] {
        &self.custom_modules
    }

    /// Get a module by name (searches both core and custom modules)
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    /// Core modules that appear in `CORE_MODULE_ORDER`, in that order
    fn ordered_core_modules(&self) -> Vec<&Arc<dyn Module>> {
        CORE_MODULE_ORDER
            .iter()
            .filter_map(|&name| self.core_modules.iter().find(|m| m.name() == name))
            .collect()
    }

    async fn run_phase(
        modules: Vec<&Arc<dyn Module>>,
        phase: Phase,
        group: &str,
        ctx: Option<&InitCtx<'_>>,
    ) -> anyhow::Result<()> {
        for module in modules {
            tracing::info!(module = module.name(), group, "{} module", phase.verb());

            let result = match (phase, ctx) {
                (Phase::Init, Some(ctx)) => module.init(ctx).await,
                (Phase::Start, Some(ctx)) => module.start(ctx).await,
                (Phase::Stop, _) => module.stop().await,
                (_, None) => Ok(()),
            };

            result.with_context(|| {
                format!(
                    "failed to {} {} module '{}'",
                    phase.verb(),
                    group,
                    module.name()
                )
            })?;
        }

        Ok(())
    }

    /// Initialize core modules in the correct order
    pub async fn init_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing core modules in order: {:?}", CORE_MODULE_ORDER);
        Self::run_phase(self.ordered_core_modules(), Phase::Init, "core", Some(ctx)).await
    }

    /// Initialize custom modules
    pub async fn init_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} custom modules", self.custom_modules.len());
        Self::run_phase(
            self.custom_modules.iter().collect(),
            Phase::Init,
            "custom",
            Some(ctx),
        )
        .await
    }

    /// Start core modules in the correct order
    pub async fn start_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Self::run_phase(self.ordered_core_modules(), Phase::Start, "core", Some(ctx)).await
    }

    /// Start custom modules
    pub async fn start_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Self::run_phase(
            self.custom_modules.iter().collect(),
            Phase::Start,
            "custom",
            Some(ctx),
        )
        .await
    }

    /// Stop custom modules first (reverse order)
    pub async fn stop_custom_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} custom modules", self.custom_modules.len());
        Self::run_phase(
            self.custom_modules.iter().rev().collect(),
            Phase::Stop,
            "custom",
            None,
        )
        .await
    }

    /// Stop core modules in reverse order
    pub async fn stop_core_modules(&self) -> anyhow::Result<()> {
        let mut modules = self.ordered_core_modules();
        modules.reverse();
        Self::run_phase(modules, Phase::Stop, "core", None).await
    }

    /// Run init and start for every module, core first
    pub async fn boot(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.init_core_modules(ctx).await?;
        self.init_custom_modules(ctx).await?;
        self.start_core_modules(ctx).await?;
        self.start_custom_modules(ctx).await
    }

    /// Stop every module, custom first. Core modules are stopped even when a
    /// custom module fails; the first error is returned.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let custom = self.stop_custom_modules().await;
        if let Err(err) = &custom {
            tracing::error!(error = %format!("{:#}", err), "continuing shutdown with core modules");
        }
        let core = self.stop_core_modules().await;
        custom.and(core)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
