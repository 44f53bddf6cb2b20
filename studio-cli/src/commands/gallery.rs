//! Gallery command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::session::Session;

/// Gallery subcommands
#[derive(Subcommand)]
pub enum GalleryCommands {
    /// List generated images, most recent first
    List {
        /// Show at most this many images
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Forget every gallery entry
    Clear,
}

pub async fn handle_gallery_command(command: GalleryCommands, session: &Session) -> Result<()> {
    match command {
        GalleryCommands::List { limit } => {
            let gallery = session.gallery.load();
            if gallery.is_empty() {
                println!("{}", "Gallery is empty.".yellow());
                return Ok(());
            }

            let shown = limit.unwrap_or(gallery.len()).min(gallery.len());
            println!(
                "{}",
                format!("Showing {} of {} image(s):", shown, gallery.len()).bold()
            );
            for item in gallery.items().iter().take(shown) {
                println!(
                    "  {} {} {}",
                    "▸".cyan(),
                    item.date.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    item.id.dimmed()
                );
                println!("    {}", item.url);
            }
            Ok(())
        }
        GalleryCommands::Clear => {
            session.gallery.clear()?;
            println!("{}", "✓ Gallery cleared".green());
            Ok(())
        }
    }
}
