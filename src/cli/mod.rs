pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "assetctl")]
#[command(about = "assetctl - Administration tool for the Asset Inventory API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Load departments, divisions, IP pools and admins from a YAML fixture")]
    Seed {
        #[arg(help = "Fixture file", default_value = "fixtures/seed.yaml")]
        file: std::path::PathBuf,
    },

    #[command(about = "IP pool management")]
    Ip {
        #[command(subcommand)]
        cmd: commands::ip::IpCommands,
    },

    #[command(about = "Administrator accounts")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(name = "service-tags", about = "Search the leased device catalog")]
    ServiceTags {
        #[arg(long, help = "Catalog CSV (defaults to SERVICE_TAG_CSV)")]
        csv: Option<std::path::PathBuf>,
        #[arg(long, help = "Device type, e.g. 'PC เช่า'")]
        device_type: Option<String>,
        #[arg(long, short, help = "Service tag substring")]
        query: Option<String>,
        #[arg(long, conflicts_with_all = ["device_type", "query"], help = "Exact service tag")]
        tag: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
        Commands::Ip { cmd } => commands::ip::handle(cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
        Commands::ServiceTags { csv, device_type, query, tag } => {
            let lookup = match tag {
                Some(tag) => commands::service_tags::Lookup::Exact(tag),
                None => commands::service_tags::Lookup::Search { device_type, query },
            };
            commands::service_tags::handle(csv, lookup, output_format)
        }
    }
}
