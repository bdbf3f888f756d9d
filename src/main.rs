use anyhow::Context;
use clap::{Args, Parser, Subcommand};

/// The main entry point for the Persons API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config().context("cannot load config")?;
    configuration::init_tracing(&settings.log_level)?;

    // Execute the appropriate command
    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                settings.server_host = host;
            }
            if let Some(port) = args.port {
                settings.server_port = port;
            }
            web_server::run_server(settings).await
        }
        Commands::Migrate => {
            let db_pool = database::connect(&settings).await?;
            database::run_migrations(&db_pool).await?;
            tracing::info!("Database migrations applied.");
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A REST service for person records, enriched with inferred gender, age and nationality.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (the default when no command is given).
    Serve(ServeArgs),
    /// Apply database migrations and exit.
    Migrate,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Overrides SERVER_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Overrides SERVER_PORT.
    #[arg(long)]
    port: Option<u16>,
}
