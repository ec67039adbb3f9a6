use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookstore")]
#[command(about = "Runs and administers the bookstore service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API until Ctrl+C or SIGTERM
    Serve,
    /// Create the books table if it does not exist, then exit
    Migrate,
    /// Print the effective settings with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings.redacted())
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookstore serve");
            bookstore_app::app::run(settings).await
        }
        Command::Migrate => {
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookstore migrate");
            bookstore_app::app::migrate(settings).await
        }
    }
}
