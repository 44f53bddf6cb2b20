//! Credit command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use studio_client::DEFAULT_TRANSACTION_LIMIT;

use crate::session::Session;

/// Credit subcommands
#[derive(Subcommand)]
pub enum CreditCommands {
    /// Show the credit balance
    Balance,
    /// Show the cost of each generation endpoint
    Pricing,
    /// Show the credit transaction history
    Transactions {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Entries per page
        #[arg(long, default_value_t = DEFAULT_TRANSACTION_LIMIT)]
        limit: u32,
    },
}

pub async fn handle_credit_command(command: CreditCommands, session: &Session) -> Result<()> {
    match command {
        CreditCommands::Balance => balance(session).await,
        CreditCommands::Pricing => pricing(session).await,
        CreditCommands::Transactions { page, limit } => transactions(session, page, limit).await,
    }
}

async fn balance(session: &Session) -> Result<()> {
    let balance = session.client.balance().await?;
    match balance.amount() {
        Some(amount) => println!("{} {}", amount.to_string().bold(), "credits".dimmed()),
        None => println!("{}", "Balance unavailable".yellow()),
    }
    Ok(())
}

async fn pricing(session: &Session) -> Result<()> {
    let entries: Vec<_> = session
        .client
        .pricing()
        .await?
        .into_iter()
        .filter(|entry| entry.is_listed())
        .collect();
    if entries.is_empty() {
        println!("{}", "No pricing information.".yellow());
        return Ok(());
    }

    println!("{}", "Pricing:".bold());
    for entry in &entries {
        let cost = entry
            .cost()
            .map(|c| format!("{} credits", c))
            .unwrap_or_else(|| "-".to_string());
        println!("  {} {:<10} {}", "▸".cyan(), entry.label(), cost);
    }
    Ok(())
}

async fn transactions(session: &Session, page: u32, limit: u32) -> Result<()> {
    let history = session.client.transactions(page, limit).await?;
    if history.transactions.is_empty() {
        println!("{}", "No transactions found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Transactions (page {}):", page).bold()
    );
    for tx in &history.transactions {
        let date = tx
            .created_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let delta = tx.delta();
        let delta = if delta >= 0 {
            format!("+{}", delta).green()
        } else {
            delta.to_string().red()
        };
        let after = tx
            .balance_after()
            .map(|b| format!("→ {}", b))
            .unwrap_or_default();
        println!("  {} {:<20} {:>8} {}", date.dimmed(), tx.label(), delta, after.dimmed());
    }
    Ok(())
}
