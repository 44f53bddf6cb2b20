//! Character Image Studio CLI
//!
//! Command-line front end for the image-generation API: account and credits,
//! seed images, character turnarounds and scenes built from a character's
//! reference images.

mod commands;
mod config;
mod progress;
mod session;
mod store;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "studio")]
#[command(about = "Character Image Studio CLI", long_about = None)]
struct Cli {
    /// Image-generation API URL
    #[arg(long, env = "STUDIO_API_URL", default_value = studio_client::DEFAULT_API_URL)]
    api_url: String,

    /// Directory for credentials, characters and the gallery
    #[arg(long, env = "STUDIO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "studio_cli=info,studio_poller=info,studio_client=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::new(cli.api_url, cli.data_dir);

    handle_command(cli.command, &config).await
}
