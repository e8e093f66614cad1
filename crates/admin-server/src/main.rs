//! Leadsite admin backend - JSON API, local site host and maintenance commands.

mod api;
mod app;

use std::path::PathBuf;

use admin_config::{init_logging, Config, Paths};
use clap::{Parser, Subcommand};

/// Leadsite command-line interface.
#[derive(Parser)]
#[command(name = "leadsite")]
#[command(about = "Lead tracking, website generation and local deployment backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (config, database, logs, deployments). Defaults to ~/.leadsite
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the admin API and the local development site host
    Serve {
        /// Admin API bind host
        #[arg(long)]
        host: Option<String>,
        /// Admin API port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Load the sample data set into the SQLite database
    Seed,
    /// Create runtime directories and a default config file
    Setup,
    /// Send one prompt to a provider and print the reply
    TestLlm {
        /// openai, openrouter or google
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        prompt: String,
        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },
    /// List the models a provider offers
    Models {
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging("leadsite", level, &paths);

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            app::run_server(config, paths, host, port).await?;
        }
        None => {
            app::run_server(config, paths, None, None).await?;
        }
        Some(Commands::Seed) => {
            app::seed_database(&paths).await?;
        }
        Some(Commands::Setup) => {
            app::setup(&config, &paths)?;
        }
        Some(Commands::TestLlm {
            provider,
            prompt,
            model,
        }) => {
            app::test_llm(&config, provider.as_deref(), &prompt, model).await?;
        }
        Some(Commands::Models { provider }) => {
            app::list_models(&config, provider.as_deref()).await?;
        }
    }

    Ok(())
}
