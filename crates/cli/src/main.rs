use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Operate the shelf book service
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until SIGINT/SIGTERM
    Serve,
    /// Insert the sample books into the configured store
    Seed,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Config => {
            println!("{:#?}", settings);
            Ok(())
        }
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            shelf_app::run(settings).await
        }
        Command::Seed => {
            shelf_telemetry::init(&settings.telemetry)?;
            let count = shelf_app::seed(&settings).await?;
            tracing::info!(count, "sample books inserted");
            println!("Database seeded with {} books", count);
            Ok(())
        }
    }
}
