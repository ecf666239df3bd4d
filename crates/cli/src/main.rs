//! Instance Advisor CLI
//!
//! Query the advisor service for replacement instance types, run the same
//! recommendation offline against local CSV tables, or inspect the tables.

mod client;
mod commands;
mod config;
mod output;

use advisor_lib::{RecommendationRequest, Requirement, DEFAULT_TOP_N};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{configure, health, inspect, recommend};
use std::path::PathBuf;

/// Instance Advisor CLI
#[derive(Parser)]
#[command(name = "iadv")]
#[command(author, version, about = "CLI for Instance Advisor", long_about = None)]
pub struct Cli {
    /// Advisor service URL (can also be set via IADV_API_URL env var)
    #[arg(long, env = "IADV_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Minimum capacity for a replacement
#[derive(Args, Debug, Clone)]
pub struct RequirementArgs {
    /// Required vCPUs
    #[arg(long, default_value_t = 0)]
    pub vcpus: u32,

    /// Required memory in MiB
    #[arg(long, default_value_t = 0)]
    pub memory_mib: u64,

    /// Required GPUs
    #[arg(long, default_value_t = 0)]
    pub gpus: u32,

    /// Maximum number of ranked candidates to show
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,
}

impl RequirementArgs {
    fn requirement(&self) -> Requirement {
        Requirement::new(self.vcpus, self.memory_mib, self.gpus)
    }
}

/// Local table files
#[derive(Args, Debug, Clone)]
pub struct LocalTables {
    /// Instance catalog CSV
    #[arg(long)]
    pub catalog: PathBuf,

    /// Interchangeability matrix CSV
    #[arg(long)]
    pub matrix: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a replacement via the advisor service
    Recommend {
        /// Current instance type
        instance: String,

        #[command(flatten)]
        requirement: RequirementArgs,

        /// Table bucket (directory on the service, or http(s) URL)
        #[arg(long)]
        bucket: Option<String>,

        /// Catalog table key within the bucket
        #[arg(long)]
        catalog_key: Option<String>,

        /// Interchangeability matrix key within the bucket
        #[arg(long)]
        matrix_key: Option<String>,
    },

    /// Recommend a replacement from local CSV files, without the service
    Local {
        /// Current instance type
        instance: String,

        #[command(flatten)]
        tables: LocalTables,

        #[command(flatten)]
        requirement: RequirementArgs,
    },

    /// Show an instance's spec and its allowed replacements from local CSV files
    Inspect {
        /// Instance type to inspect
        instance: String,

        #[command(flatten)]
        tables: LocalTables,
    },

    /// Show advisor service health and readiness
    Health,

    /// View or change saved defaults
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show saved defaults
    Show,

    /// Save defaults used when flags are omitted
    Set {
        #[arg(long)]
        api_url: Option<String>,

        #[arg(long)]
        bucket: Option<String>,

        #[arg(long)]
        catalog_key: Option<String>,

        #[arg(long)]
        matrix_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    if cli.verbose {
        output::print_info(&format!("Using advisor at {}", api_url));
    }

    match cli.command {
        Commands::Recommend {
            instance,
            requirement,
            bucket,
            catalog_key,
            matrix_key,
        } => {
            let client = client::ApiClient::new(&api_url)?;
            let request = RecommendationRequest {
                current_instance_type: Some(instance),
                required_vcpus: requirement.vcpus,
                required_memory_mib: requirement.memory_mib,
                required_gpus: requirement.gpus,
                top_n: requirement.top_n,
                bucket: bucket.or(config.bucket),
                catalog_key: catalog_key.or(config.catalog_key),
                matrix_key: matrix_key.or(config.matrix_key),
            };
            recommend::recommend_remote(&client, &request, cli.format).await?;
        }
        Commands::Local {
            instance,
            tables,
            requirement,
        } => {
            recommend::recommend_local(
                &tables.catalog,
                &tables.matrix,
                &instance,
                requirement.requirement(),
                requirement.top_n,
                cli.format,
            )
            .await?;
        }
        Commands::Inspect { instance, tables } => {
            inspect::inspect_instance(&tables.catalog, &tables.matrix, &instance, cli.format).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&api_url)?;
            health::show_health(&client, cli.format).await?;
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => configure::show_config(&config, cli.format)?,
            ConfigCommands::Set {
                api_url,
                bucket,
                catalog_key,
                matrix_key,
            } => {
                let updates = config::Config {
                    api_url,
                    bucket,
                    catalog_key,
                    matrix_key,
                };
                configure::set_config(config, updates)?;
            }
        },
    }

    Ok(())
}
