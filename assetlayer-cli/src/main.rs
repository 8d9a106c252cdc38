//! AssetLayer CLI - Command-line interface
//!
//! Fetches entities, sections, blobs and batches from a remote asset API
//! through the caching, coalescing, retrying `assetlayer` client.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use assetlayer::client::BatchItem;
use assetlayer::logging::{init_logging, LoggingConfig};
use clap::{Parser, Subcommand};
use tracing::debug;

use commands::common::{create_client, parse_batch_item, ClientArgs};
use commands::fetch::{self, FetchTarget};
use error::CliError;

#[derive(Parser)]
#[command(name = "assetlayer")]
#[command(version = assetlayer::VERSION)]
#[command(about = "Fetch game assets through a caching, coalescing client", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print client diagnostics as JSON to stderr after the command
    #[arg(long, global = true)]
    diagnostics: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    client: ClientArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a whole entity
    Entity {
        /// Asset type (e.g. map, mob, item)
        asset_type: String,
        /// Entity id
        id: String,
    },

    /// Fetch one section of an entity
    Section {
        /// Asset type
        asset_type: String,
        /// Entity id
        id: String,
        /// Section name
        section: String,
    },

    /// Fetch a content-addressed blob
    Blob {
        /// Content hash
        hash: String,
        /// Write the blob to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch several items in one request
    Batch {
        /// Items as type:id or type:id:section
        #[arg(required = true, value_parser = parse_batch_item)]
        items: Vec<BatchItem>,
    },
}

impl From<Commands> for FetchTarget {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Entity { asset_type, id } => FetchTarget::Entity { asset_type, id },
            Commands::Section {
                asset_type,
                id,
                section,
            } => FetchTarget::Section {
                asset_type,
                id,
                section,
            },
            Commands::Blob { hash, output } => FetchTarget::Blob { hash, output },
            Commands::Batch { items } => FetchTarget::Batch { items },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut logging = LoggingConfig::from_verbosity(cli.verbose);
    if let Some(path) = cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = init_logging(&logging)?;

    debug!(version = assetlayer::VERSION, "Starting assetlayer");

    let client = create_client(&cli.client)?;
    fetch::run(&client, cli.command.into(), cli.diagnostics).await
}
