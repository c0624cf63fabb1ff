//! Terraform Provider for Bitbucket
//!
//! Operator entry point: dumps the provider schema and reads groups through
//! the same code paths the plugin host drives.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use bitbucket_provider::provider::BitbucketProvider;
use bitbucket_provider::state::decode_dynamic_value;
use bitbucket_provider::{BitbucketClient, ProviderConfig};

/// Bitbucket Terraform provider
#[derive(Parser)]
#[command(name = "terraform-provider-bitbucket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provider configuration file (TOML)
    #[arg(long, env = "BITBUCKET_PROVIDER_CONFIG", default_value = "bitbucket-provider.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider and resource schemas as JSON
    Schema,

    /// Import an existing object and print its state as JSON
    Import {
        /// Resource type, e.g. bitbucket_group
        #[arg(long = "type", default_value = "bitbucket_group")]
        resource_type: String,

        /// Object ID, e.g. WORKSPACE/GROUP-SLUG
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ProviderConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env();
    let client = BitbucketClient::new(&config).context("building API client")?;
    info!("Starting Bitbucket provider against {}", client.base_url());

    let provider = BitbucketProvider::new(Arc::new(client));

    match cli.command {
        Commands::Schema => {
            let schema = provider.get_provider_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Import { resource_type, id } => {
            let response = provider.import_resource_state(&resource_type, &id).await;
            if let Some(diagnostic) = response.diagnostics.first() {
                anyhow::bail!("{}: {}", diagnostic.summary, diagnostic.detail);
            }
            for imported in response.imported_resources {
                let state = decode_dynamic_value(&imported.state.msgpack)?;
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
        }
    }

    Ok(())
}
