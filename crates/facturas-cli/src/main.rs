use anyhow::Result;
use clap::{Parser, Subcommand};
use facturas_core::{ClientConfig, GroupId};
use facturas_infrastructure::ConfigService;
use facturas_infrastructure::config_service::apply_overrides;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "facturas")]
#[command(about = "Facturas - group invoice PDFs by provider and download them merged", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/facturas/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload PDF or ZIP files and print the resulting groups
    Analyze {
        files: Vec<PathBuf>,
        /// Save the ZIP of all groups into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// Download the merged PDF of one group
    Download {
        group_id: i64,
        /// Group base name, used as the file name `{name}.pdf`. The backend
        /// has no lookup by id, so without it the file is named `{id}.pdf`
        #[arg(long)]
        name: Option<String>,
        /// Target directory (defaults to the downloads folder)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a group on the backend
    Delete { group_id: i64 },
    /// Wait until the backend has finished its cold start
    Wake,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.clone(), cli.api_url.clone())?;
    tracing::debug!("[CLI] Using backend {}", config.base_url());

    match cli.command {
        Commands::Analyze { files, download } => {
            commands::analyze::run(&config, &files, download).await?
        }
        Commands::Download {
            group_id,
            name,
            out,
        } => commands::remote::download(&config, GroupId(group_id), name, out).await?,
        Commands::Delete { group_id } => {
            commands::remote::delete(&config, GroupId(group_id)).await?
        }
        Commands::Wake => commands::wake::run(&config).await?,
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, api_url: Option<String>) -> Result<ClientConfig> {
    let service = match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = service.get_config()?;
    Ok(apply_overrides(config, api_url))
}
