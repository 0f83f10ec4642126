use anyhow::Context;
use shelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    shelf_app::run(settings).await
}
