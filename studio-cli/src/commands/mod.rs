//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod asset;
mod auth;
mod bundles;
mod character;
mod credits;
mod gallery;
mod generate;

pub use asset::AssetCommands;
pub use auth::AuthCommands;
pub use bundles::BundleCommands;
pub use character::CharacterCommands;
pub use credits::CreditCommands;
pub use gallery::GalleryCommands;
pub use generate::GenerateCommands;

use anyhow::Result;
use clap::Subcommand;
use tracing::warn;

use crate::config::Config;
use crate::session::Session;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Account registration and login
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Credit balance, pricing and history
    Credits {
        #[command(subcommand)]
        command: CreditCommands,
    },
    /// Credit bundles and payments
    Bundles {
        #[command(subcommand)]
        command: BundleCommands,
    },
    /// Image generation
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
    /// Generation status and downloads
    Asset {
        #[command(subcommand)]
        command: AssetCommands,
    },
    /// Saved characters
    Character {
        #[command(subcommand)]
        command: CharacterCommands,
    },
    /// Generated image history
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module, then saves any
/// credentials the API client picked up along the way.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let session = Session::open(config);

    let result = match command {
        Commands::Auth { command } => auth::handle_auth_command(command, &session).await,
        Commands::Credits { command } => credits::handle_credit_command(command, &session).await,
        Commands::Bundles { command } => bundles::handle_bundle_command(command, &session).await,
        Commands::Generate { command } => {
            generate::handle_generate_command(command, &session).await
        }
        Commands::Asset { command } => asset::handle_asset_command(command, &session).await,
        Commands::Character { command } => {
            character::handle_character_command(command, &session).await
        }
        Commands::Gallery { command } => gallery::handle_gallery_command(command, &session).await,
    };

    if let Err(e) = session.persist() {
        warn!("Failed to save credentials: {:#}", e);
    }

    result
}
