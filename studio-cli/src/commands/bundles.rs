//! Bundle command handlers
//!
//! Lists credit bundles and starts or checks payments. Payment itself happens
//! in the browser at the returned checkout URL.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;

use crate::session::Session;

/// Bundle subcommands
#[derive(Subcommand)]
pub enum BundleCommands {
    /// List the credit bundles
    List,
    /// Start a checkout for a bundle
    Buy {
        /// Bundle ID
        id: i64,
    },
    /// Check the status of a payment
    Status {
        /// Payment ID returned by `buy`
        payment_id: i64,
    },
}

pub async fn handle_bundle_command(command: BundleCommands, session: &Session) -> Result<()> {
    match command {
        BundleCommands::List => list_bundles(session).await,
        BundleCommands::Buy { id } => buy_bundle(session, id).await,
        BundleCommands::Status { payment_id } => payment_status(session, payment_id).await,
    }
}

async fn list_bundles(session: &Session) -> Result<()> {
    let bundles = session.client.bundles().await?;
    if bundles.is_empty() {
        println!("{}", "No bundles available.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} bundle(s):", bundles.len()).bold());
    println!();
    for bundle in &bundles {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            bundle.display_name().bold(),
            format!("(id {})", bundle.id).dimmed()
        );
        if let Some(credits) = bundle.credits {
            println!("    Credits: {}", credits);
        }
        println!("    Price:   {}", bundle.display_price());
        if let Some(description) = &bundle.description {
            println!("    {}", description.dimmed());
        }
        println!();
    }
    Ok(())
}

async fn buy_bundle(session: &Session, bundle_id: i64) -> Result<()> {
    let checkout = session.client.checkout(bundle_id).await?;
    let Some(url) = checkout.payment_url() else {
        bail!("Checkout created but no payment URL was returned");
    };

    println!("{}", "✓ Checkout created".green().bold());
    println!("  Open this page to pay: {}", url.cyan());
    if let Some(payment_id) = checkout.payment_id {
        println!(
            "  Then check it with:    {}",
            format!("studio bundles status {}", payment_id).dimmed()
        );
    }
    Ok(())
}

async fn payment_status(session: &Session, payment_id: i64) -> Result<()> {
    let status = session.client.payment_status(payment_id).await?;
    let state = status.status.as_deref().unwrap_or("unknown");
    let colored_state = match state.to_ascii_lowercase().as_str() {
        "completed" | "paid" | "succeeded" => state.green(),
        "failed" | "cancelled" | "expired" => state.red(),
        _ => state.yellow(),
    };

    println!("{}", "Payment:".bold());
    println!("  ID:     {}", payment_id);
    println!("  Status: {}", colored_state);
    if let Some(credits) = status.credits {
        println!("  Credits: {}", credits);
    }
    Ok(())
}
