//! ScholarHub - access-controlled project registry
//!
//! Serves the Projects API and offers local inspection commands over the
//! same project store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use scholarhub::{config::ScholarHubConfig, projects::ProjectService};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scholarhub")]
#[command(author = "ScholarHub Team")]
#[command(version)]
#[command(about = "Access-controlled project registry for academic networks")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SCHOLARHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print projects as JSON
    List {
        /// Identity to list as; omit for an anonymous view
        #[arg(long)]
        viewer: Option<String>,

        /// Ignore visibility and print every project
        #[arg(long, conflicts_with = "viewer")]
        all: bool,
    },

    /// Print one project as JSON
    Show {
        /// Project id
        id: u64,

        /// Identity to view as
        #[arg(long)]
        viewer: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("scholarhub={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match cli.config {
        Some(path) => ScholarHubConfig::load(&path)?,
        None => ScholarHubConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::List { viewer, all } => {
            let service = ProjectService::from_config_read_only(&config).await?;
            let projects = if all {
                service.list_all_unfiltered().await
            } else {
                service.list_visible(viewer.as_deref()).await
            };
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        Commands::Show { id, viewer } => {
            let service = ProjectService::from_config_read_only(&config).await?;
            let project = service.get_visible(id, viewer.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(mut config: ScholarHubConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!("Starting ScholarHub");
    scholarhub::api::serve(&config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down...");
    })
    .await?;

    Ok(())
}

fn show_config(config: Option<&ScholarHubConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
