//! Generate command handlers
//!
//! Single images (seed, create, random) are submitted and then polled until
//! the image is ready. `setchar` submits a turnaround batch from a seed image,
//! polls all of its generations, downloads the finished references and saves
//! the result as a character.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use studio_core::domain::character::Character;
use studio_core::dto::generation::{
    CreateRequest, DEFAULT_ASPECT_RATIO, GenerationResponse, MAX_REFERENCE_IMAGES, RandomRequest,
    SeedRequest, TurnaroundRequest, cap_references,
};
use tracing::{info, warn};

use super::asset::{cancel_on_ctrl_c, print_batch_outcome, wait_for_image};
use crate::progress::TerminalProgress;
use crate::session::Session;
use crate::store::CharacterStore;
use crate::store::characters::{LARGE_IMAGE_BYTES, encode_image_file};

/// Generate subcommands
#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate a seed image from a text prompt
    Seed {
        prompt: String,

        #[arg(long, default_value = DEFAULT_ASPECT_RATIO)]
        aspect_ratio: String,
    },
    /// Generate a scene featuring a saved character
    Create {
        /// Character slug
        #[arg(long)]
        character: String,

        prompt: String,

        /// Optional input image URL to build the scene on
        #[arg(long)]
        input_image: Option<String>,
    },
    /// Generate a random scene featuring a saved character
    Random {
        /// Character slug
        #[arg(long)]
        character: String,
    },
    /// Create a character: generate reference images from a seed image
    Setchar {
        /// Character name
        #[arg(long)]
        name: String,

        /// Seed image URL or local image file
        #[arg(long)]
        seed: String,

        /// Upper bound on polling rounds
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Seconds between polling rounds
        #[arg(long)]
        round_delay: Option<u64>,
    },
}

pub async fn handle_generate_command(command: GenerateCommands, session: &Session) -> Result<()> {
    match command {
        GenerateCommands::Seed {
            prompt,
            aspect_ratio,
        } => generate_seed(session, prompt, aspect_ratio).await,
        GenerateCommands::Create {
            character,
            prompt,
            input_image,
        } => generate_create(session, &character, prompt, input_image).await,
        GenerateCommands::Random { character } => generate_random(session, &character).await,
        GenerateCommands::Setchar {
            name,
            seed,
            max_rounds,
            round_delay,
        } => set_character(session, &name, &seed, max_rounds, round_delay).await,
    }
}

// =============================================================================
// Single Images
// =============================================================================

async fn generate_seed(session: &Session, prompt: String, aspect_ratio: String) -> Result<()> {
    let request = SeedRequest {
        prompt,
        aspect_ratio,
    };
    let response = session
        .client
        .generate_seed(request)
        .await
        .context("Seed generation failed")?;

    await_generation(session, &response).await
}

async fn generate_create(
    session: &Session,
    slug: &str,
    prompt: String,
    input_image_url: Option<String>,
) -> Result<()> {
    let character = find_character(session, slug)?;
    let request = CreateRequest {
        prompt,
        reference_image_urls: character_references(session, &character)?,
        input_image_url,
    };
    let response = session
        .client
        .generate_create(request)
        .await
        .context("Scene generation failed")?;

    await_generation(session, &response).await
}

async fn generate_random(session: &Session, slug: &str) -> Result<()> {
    let character = find_character(session, slug)?;
    let request = RandomRequest {
        reference_image_urls: character_references(session, &character)?,
        character_description: character.name.clone(),
    };
    let response = session
        .client
        .generate_random(request)
        .await
        .context("Random generation failed")?;

    await_generation(session, &response).await
}

async fn await_generation(session: &Session, response: &GenerationResponse) -> Result<()> {
    let Some(job_id) = response.job_id() else {
        bail!("The API did not return a generation ID");
    };

    let cost = response
        .credits_used
        .map(|c| format!(" ({} credits)", c))
        .unwrap_or_default();
    println!(
        "{} {}{}",
        "✓ Generation queued".green(),
        job_id.to_string().cyan(),
        cost.dimmed()
    );

    wait_for_image(session, &job_id).await
}

fn find_character(session: &Session, slug: &str) -> Result<Character> {
    session.characters.scan()?;
    session
        .characters
        .get(slug)
        .with_context(|| format!("Character '{}' not found", slug))
}

/// Reference images sent for a character: remote URLs, else local files as data URIs
fn character_references(session: &Session, character: &Character) -> Result<Vec<String>> {
    let references = if character.reference_urls.is_empty() {
        session
            .characters
            .local_references(&character.slug, MAX_REFERENCE_IMAGES)
    } else {
        cap_references(&character.reference_urls)
    };

    if references.is_empty() {
        bail!(
            "Character '{}' has no reference images (local or remote)",
            character.slug
        );
    }
    Ok(references)
}

// =============================================================================
// Character Turnaround
// =============================================================================

async fn set_character(
    session: &Session,
    name: &str,
    seed: &str,
    max_rounds: Option<u32>,
    round_delay: Option<u64>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Character name is required");
    }

    let mut config = session.config.batch.clone();
    if let Some(rounds) = max_rounds {
        config.max_rounds = rounds;
    }
    if let Some(secs) = round_delay {
        config.round_delay = Duration::from_secs(secs);
    }
    config.validate()?;

    let seed_image_url = resolve_seed(seed)?;
    let request = TurnaroundRequest::with_default_prompts(seed_image_url);
    println!(
        "{}",
        format!("Submitting turnaround for {} ({} poses)...", name, request.prompts.len()).bold()
    );

    let response = session
        .client
        .generate_turnaround(request)
        .await
        .context("Turnaround request failed")?;
    let job_ids = response.job_ids();
    if job_ids.is_empty() {
        bail!("The API returned no generation IDs");
    }

    println!(
        "{} {} generation(s) queued, checking every {:?}",
        "✓".green(),
        job_ids.len(),
        config.round_delay
    );

    let outcome = session
        .batch_poller(config)
        .with_progress(Arc::new(TerminalProgress::default()))
        .with_cancellation(cancel_on_ctrl_c())
        .poll(&job_ids)
        .await?;

    print_batch_outcome(&outcome);
    if outcome.is_total_failure() {
        bail!("No reference images were generated, character not saved");
    }

    let slug = CharacterStore::slug_for(name);
    let urls = outcome.urls();
    let local_files = download_references(session, &slug, &urls).await;
    let character = session
        .characters
        .register(name, &slug, seed, urls, local_files)?;

    println!();
    println!("{} {}", "✓ Character saved:".green().bold(), character.name.cyan());
    println!("  Slug:       {}", character.slug);
    println!("  References: {}", character.reference_count);
    println!("  Folder:     {}", character.local_dir.dimmed());
    Ok(())
}

/// Seed argument as sent to the API: URLs pass through, files become data URIs
fn resolve_seed(seed: &str) -> Result<String> {
    let seed = seed.trim();
    if seed.starts_with("http://") || seed.starts_with("https://") || seed.starts_with("data:") {
        return Ok(seed.to_string());
    }

    let path = Path::new(seed);
    if !path.is_file() {
        bail!("Seed must be an image URL or an existing file: {}", seed);
    }

    let image = encode_image_file(path)?;
    if image.is_large() {
        println!(
            "{}",
            format!(
                "⚠ Seed image is {:.1} MB (limit {:.1} MB); the API may reject it",
                image.size as f64 / 1_000_000.0,
                LARGE_IMAGE_BYTES as f64 / 1_000_000.0
            )
            .yellow()
        );
    }
    Ok(image.data_uri)
}

/// Downloads the finished references into the character folder
///
/// Returns the names of the files written; failed downloads are skipped.
async fn download_references(session: &Session, slug: &str, urls: &[String]) -> Vec<String> {
    let mut files = Vec::new();
    for (index, url) in urls.iter().enumerate() {
        let image = match session.client.fetch_image(url).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to download reference {}: {}", index + 1, e);
                continue;
            }
        };

        match session
            .characters
            .write_reference(slug, index, &image.content_type, &image.bytes)
        {
            Ok(file_name) => files.push(file_name),
            Err(e) => warn!("Failed to save reference {}: {:#}", index + 1, e),
        }
    }

    info!("Downloaded {}/{} references for {}", files.len(), urls.len(), slug);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_seed_passes_urls_through() {
        assert_eq!(
            resolve_seed(" https://cdn/seed.png ").unwrap(),
            "https://cdn/seed.png"
        );
        assert_eq!(
            resolve_seed("data:image/png;base64,AAAA").unwrap(),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_resolve_seed_encodes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.png");
        std::fs::write(&path, b"png").unwrap();

        let uri = resolve_seed(path.to_str().unwrap()).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(resolve_seed("/definitely/not/here.png").is_err());
    }
}
