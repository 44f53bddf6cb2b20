//! Character command handlers
//!
//! Lists, inspects and deletes saved characters. Folders of images copied
//! into the characters directory by hand are registered on `list` and
//! `rescan`.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use studio_core::domain::character::Character;

use crate::session::Session;

/// Character subcommands
#[derive(Subcommand)]
pub enum CharacterCommands {
    /// List saved characters
    List,
    /// Show one character
    Get {
        /// Character slug
        slug: String,
    },
    /// Delete a character and its images
    Delete {
        /// Character slug
        slug: String,
    },
    /// Register character folders added by hand
    Rescan,
    /// Print the image folder of a character
    Folder {
        /// Character slug
        slug: String,
    },
}

pub async fn handle_character_command(command: CharacterCommands, session: &Session) -> Result<()> {
    match command {
        CharacterCommands::List => list_characters(session),
        CharacterCommands::Get { slug } => get_character(session, &slug),
        CharacterCommands::Delete { slug } => delete_character(session, &slug),
        CharacterCommands::Rescan => rescan(session),
        CharacterCommands::Folder { slug } => show_folder(session, &slug),
    }
}

fn list_characters(session: &Session) -> Result<()> {
    let characters = session.characters.list()?;
    if characters.is_empty() {
        println!("{}", "No characters saved.".yellow());
        println!(
            "  Create one with {} or copy a folder of images into {}",
            "studio generate setchar".cyan(),
            session.characters.dir().display().to_string().dimmed()
        );
        return Ok(());
    }

    println!("{}", format!("Found {} character(s):", characters.len()).bold());
    println!();
    for character in &characters {
        print_character_summary(character);
    }
    Ok(())
}

fn get_character(session: &Session, slug: &str) -> Result<()> {
    let Some(character) = session.characters.get(slug) else {
        bail!("Character '{}' not found", slug);
    };

    println!("{}", "Character Details:".bold());
    println!("  Name:       {}", character.name.cyan());
    println!("  Slug:       {}", character.slug);
    println!(
        "  Created:    {}",
        character.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    println!("  References: {}", character.reference_count);
    println!("  Folder:     {}", character.local_dir.dimmed());
    if !character.seed_url.is_empty() {
        println!("  Seed:       {}", character.seed_url);
    }

    if !character.reference_urls.is_empty() {
        println!();
        println!("{}", "Reference URLs:".bold());
        for url in &character.reference_urls {
            println!("  {}", url);
        }
    }
    if !character.local_files.is_empty() {
        println!();
        println!("{}", "Local files:".bold());
        for file in &character.local_files {
            println!("  {}", file);
        }
    }
    Ok(())
}

fn delete_character(session: &Session, slug: &str) -> Result<()> {
    if session.characters.delete(slug)? {
        println!("{} {}", "✓ Deleted character".green(), slug.cyan());
    } else {
        println!("{}", format!("Character '{}' not found.", slug).yellow());
    }
    Ok(())
}

fn rescan(session: &Session) -> Result<()> {
    let report = session.characters.scan()?;
    for slug in &report.added {
        println!("  {} {}", "Added".green(), slug);
    }
    for slug in &report.updated {
        println!("  {} {}", "Updated".cyan(), slug);
    }

    let total = session.characters.load().characters.len();
    println!(
        "{}",
        format!("✓ Rescan complete, {} character(s)", total).green()
    );
    Ok(())
}

fn show_folder(session: &Session, slug: &str) -> Result<()> {
    let folder = session.characters.folder(slug)?;
    if !folder.is_dir() {
        bail!("Folder not found: {}", folder.display());
    }
    println!("{}", folder.display());
    Ok(())
}

fn print_character_summary(character: &Character) {
    let source = if character.reference_urls.is_empty() {
        "local".dimmed()
    } else {
        "remote".dimmed()
    };

    println!("  {} {} {}", "▸".cyan(), character.name.bold(), character.slug.dimmed());
    println!(
        "    References: {} {}",
        character.reference_count, source
    );
    println!(
        "    Created:    {}",
        character.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    println!();
}
