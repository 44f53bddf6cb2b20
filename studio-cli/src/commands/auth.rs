//! Auth command handlers
//!
//! Handles account registration, login with a client id/secret, logout and
//! display or export of the saved credentials.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use studio_client::Credentials;

use crate::session::Session;
use crate::store::credentials::MaskedCredentials;

/// Auth subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Register a new account and log in with it
    Register,
    /// Log in with an existing client id and secret
    Login {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        client_secret: String,
    },
    /// Log in again with the saved credentials
    AutoLogin,
    /// Delete the saved credentials
    Logout,
    /// Show the logged-in account
    Me,
    /// Show the saved credentials
    Credentials {
        /// Print the client secret as well
        #[arg(long)]
        export: bool,
    },
}

/// Handle auth commands
///
/// # Arguments
/// * `command` - The auth command to execute
/// * `session` - Client and stores for this invocation
pub async fn handle_auth_command(command: AuthCommands, session: &Session) -> Result<()> {
    match command {
        AuthCommands::Register => register(session).await,
        AuthCommands::Login {
            client_id,
            client_secret,
        } => login(session, &client_id, &client_secret).await,
        AuthCommands::AutoLogin => auto_login(session).await,
        AuthCommands::Logout => logout(session),
        AuthCommands::Me => me(session).await,
        AuthCommands::Credentials { export } => show_credentials(session, export),
    }
}

async fn register(session: &Session) -> Result<()> {
    let registration = session
        .client
        .register()
        .await
        .context("Registration failed")?;

    println!("{}", "✓ Account registered".green().bold());
    println!("  Client ID:     {}", registration.account.client_id.cyan());
    println!("  Client Secret: {}", registration.account.client_secret.cyan());
    if let Some(message) = &registration.account.message {
        println!("  {}", message.dimmed());
    }
    println!();
    println!(
        "{}",
        "Keep these credentials safe. They are saved locally and cannot be recovered.".yellow()
    );

    if !registration.logged_in {
        println!(
            "{}",
            "Registered but automatic login failed. Use `studio auth login` with the credentials above."
                .yellow()
        );
    }

    Ok(())
}

async fn login(session: &Session, client_id: &str, client_secret: &str) -> Result<()> {
    session
        .client
        .login(client_id, client_secret)
        .await
        .context("Login failed")?;

    println!("{}", "✓ Logged in".green().bold());
    Ok(())
}

async fn auto_login(session: &Session) -> Result<()> {
    let credentials = session.credentials.load();
    let Some((client_id, client_secret)) = credentials.login_pair() else {
        println!("{}", "No saved credentials. Register or log in first.".yellow());
        return Ok(());
    };

    session
        .client
        .login(client_id, client_secret)
        .await
        .context("Automatic login failed")?;

    println!("{} {}", "✓ Logged in as".green().bold(), client_id.cyan());
    Ok(())
}

fn logout(session: &Session) -> Result<()> {
    session.client.set_credentials(Credentials::default());
    if session.credentials.clear()? {
        println!("{}", "✓ Logged out, saved credentials deleted".green());
    } else {
        println!("{}", "No saved credentials.".yellow());
    }
    Ok(())
}

async fn me(session: &Session) -> Result<()> {
    let account = session.client.me().await?;

    println!("{}", "Account:".bold());
    println!(
        "  Client ID: {}",
        account.client_id.as_deref().unwrap_or("-").cyan()
    );
    if let Some(tier) = &account.tier {
        println!("  Tier:      {}", tier);
    }
    if let Some(balance) = account.balance {
        println!("  Balance:   {} credits", balance.to_string().bold());
    }
    Ok(())
}

fn show_credentials(session: &Session, export: bool) -> Result<()> {
    let credentials = session.credentials.load();
    if credentials.is_empty() {
        println!("{}", "No saved credentials.".yellow());
        return Ok(());
    }

    if export {
        println!("{}", "Credentials (keep secret):".bold());
        println!(
            "  Client ID:     {}",
            credentials.client_id.as_deref().unwrap_or("")
        );
        println!(
            "  Client Secret: {}",
            credentials.client_secret.as_deref().unwrap_or("")
        );
        return Ok(());
    }

    let masked = MaskedCredentials::from(&credentials);
    let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };
    println!("{}", "Saved credentials:".bold());
    println!("  Client ID: {}", masked.client_id.cyan());
    println!("  Secret:    {}", yes_no(masked.has_secret));
    println!("  Token:     {}", yes_no(masked.has_token));
    println!("  File:      {}", session.credentials.path().display().to_string().dimmed());
    Ok(())
}
