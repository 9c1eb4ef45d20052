//! Agent Battery CLI - Command-line interface for Agent Battery
//!
//! Provides commands for:
//! - Managing tracked provider accounts
//! - Viewing battery status across accounts
//! - Storing and validating credentials
//! - Browsing usage snapshots and sync run history
//! - Triggering manual syncs
//! - Viewing and changing settings

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    accounts::AccountsCommand, credential::CredentialCommand, runs::RunsCommand,
    settings::SettingsCommand, snapshots::SnapshotsCommand, status::StatusCommand,
    sync::SyncCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "agentbattery",
    version,
    about = "Battery gauge for AI provider accounts"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage tracked provider accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),
    /// Show battery status across all accounts
    Status(StatusCommand),
    /// Store or validate an account credential
    #[command(subcommand)]
    Credential(CredentialCommand),
    /// Show usage snapshot history for an account
    Snapshots(SnapshotsCommand),
    /// Show sync run history for an account
    Runs(RunsCommand),
    /// Sync one account immediately
    Sync(SyncCommand),
    /// View and change application settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Accounts(cmd) => cmd.execute(format).await,
        Commands::Status(cmd) => cmd.execute(format).await,
        Commands::Credential(cmd) => cmd.execute(format).await,
        Commands::Snapshots(cmd) => cmd.execute(format).await,
        Commands::Runs(cmd) => cmd.execute(format).await,
        Commands::Sync(cmd) => cmd.execute(format).await,
        Commands::Settings(cmd) => cmd.execute(format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_subcommand() {
        let cli = Cli::parse_from(["agentbattery", "--json", "status"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_accounts_add_args() {
        let cli = Cli::parse_from([
            "agentbattery",
            "accounts",
            "add",
            "openai",
            "Work key",
            "--auth-type",
            "api_key",
        ]);
        match cli.command {
            Commands::Accounts(AccountsCommand::Add(args)) => {
                assert_eq!(args.provider, "openai");
                assert_eq!(args.name, "Work key");
                assert_eq!(args.auth_type, "api_key");
            }
            _ => panic!("expected accounts add"),
        }
    }
}
