//! Asset command handlers
//!
//! Inspects generations by ID: current status, download URL, and waiting for
//! one or more generations to finish. Waiting on several IDs resumes a batch
//! that was interrupted or ran out of rounds.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use studio_core::domain::batch::BatchOutcome;
use studio_core::domain::job::{JobId, JobStatus};
use studio_poller::SingleOutcome;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::progress::TerminalProgress;
use crate::session::Session;

/// Asset subcommands
#[derive(Subcommand)]
pub enum AssetCommands {
    /// Show the status of a generation
    Status {
        /// Generation ID
        id: String,
    },
    /// Show the download URL of a finished generation
    Download {
        /// Generation ID
        id: String,

        /// Also save the image to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Wait for generations to finish
    Wait {
        /// Generation IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub async fn handle_asset_command(command: AssetCommands, session: &Session) -> Result<()> {
    match command {
        AssetCommands::Status { id } => show_status(session, &JobId::from(id)).await,
        AssetCommands::Download { id, output } => {
            download(session, &JobId::from(id), output).await
        }
        AssetCommands::Wait { ids } => {
            let ids: Vec<JobId> = ids.into_iter().map(JobId::from).collect();
            wait(session, &ids).await
        }
    }
}

async fn show_status(session: &Session, job_id: &JobId) -> Result<()> {
    let status = session.client.asset_status(job_id).await?;
    let report = status.report();

    let label = match report.status {
        JobStatus::Completed => "completed".green(),
        JobStatus::Failed => "failed".red(),
        JobStatus::Pending => "pending".yellow(),
    };

    println!("  Generation: {}", job_id.to_string().cyan());
    println!("  Status:     {}", label);
    if let Some(raw) = status.status.as_deref() {
        println!("  Reported:   {}", raw.dimmed());
    }
    if let Some(message) = report.error_message {
        println!("  Error:      {}", message.red());
    }
    Ok(())
}

async fn download(session: &Session, job_id: &JobId, output: Option<PathBuf>) -> Result<()> {
    let info = session.client.asset_download(job_id).await?;
    let Some(url) = info.url() else {
        bail!("No download URL for {}", job_id);
    };
    println!("{}", url);

    if let Some(path) = output {
        let image = session.client.fetch_image(url).await?;
        std::fs::write(&path, &image.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{} {} ({} bytes)",
            "✓ Saved".green(),
            path.display(),
            image.bytes.len()
        );
    }
    Ok(())
}

async fn wait(session: &Session, ids: &[JobId]) -> Result<()> {
    if let [job_id] = ids {
        return wait_for_image(session, job_id).await;
    }

    let outcome = session
        .batch_poller(session.config.batch.clone())
        .with_progress(Arc::new(TerminalProgress::default()))
        .with_cancellation(cancel_on_ctrl_c())
        .poll(ids)
        .await?;

    print_batch_outcome(&outcome);
    for (id, url) in &outcome.resolved {
        session.gallery.add(id.as_str(), url)?;
        println!("  {} {}", id.short().dimmed(), url);
    }
    Ok(())
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Polls a single generation, records it in the gallery and prints the result
pub(super) async fn wait_for_image(session: &Session, job_id: &JobId) -> Result<()> {
    println!("{} {}", "Waiting for".dimmed(), job_id.to_string().dimmed());

    let outcome = session
        .single_poller()
        .with_progress(Arc::new(TerminalProgress::default()))
        .with_cancellation(cancel_on_ctrl_c())
        .poll(job_id)
        .await?;

    match outcome {
        SingleOutcome::Completed { url, .. } => {
            session.gallery.add(job_id.as_str(), &url)?;
            println!("{}", "✓ Image ready".green().bold());
            println!("  {}", url);
            Ok(())
        }
        SingleOutcome::Failed { message } => {
            bail!(
                "Generation failed: {}",
                message.unwrap_or_else(|| "unknown error".to_string())
            )
        }
        SingleOutcome::TimedOut { rounds } => {
            println!(
                "{}",
                format!("Still generating after {} checks.", rounds).yellow()
            );
            println!(
                "  Check again with {}",
                format!("studio asset wait {}", job_id).cyan()
            );
            Ok(())
        }
        SingleOutcome::Cancelled => {
            println!("{}", "Stopped waiting.".yellow());
            Ok(())
        }
    }
}

/// Token cancelled when the user presses Ctrl-C
pub(super) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, keeping what has completed so far");
            trigger.cancel();
        }
    });
    token
}

/// Prints the "N of M completed" line, colored by how the batch went
pub(super) fn print_batch_outcome(outcome: &BatchOutcome) {
    let summary = outcome.summary();
    if outcome.is_complete_success() {
        println!("{}", format!("✓ {}", summary).green().bold());
    } else if outcome.is_total_failure() {
        println!("{}", format!("✗ {}", summary).red().bold());
    } else {
        println!("{}", format!("⚠ {}", summary).yellow().bold());
    }

    if outcome.cancelled {
        println!("{}", "  Polling was interrupted.".yellow());
    }
    if !outcome.failed.is_empty() {
        println!("  {} failed", outcome.failed.len().to_string().red());
    }
    if !outcome.unresolved.is_empty() {
        let ids: Vec<&str> = outcome.unresolved.iter().map(JobId::as_str).collect();
        println!(
            "  {} still generating. Resume with:",
            outcome.unresolved.len().to_string().yellow()
        );
        println!("    {}", format!("studio asset wait {}", ids.join(" ")).cyan());
    }
}
