//! Accounts command - manage tracked provider accounts

use anyhow::Result;
use clap::{Args, Subcommand};

use agentbattery_core::domain::{AccountId, AuthType, Provider};
use agentbattery_sync::surface::AccountPatch;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List all tracked accounts
    List,
    /// Add a new account
    Add(AddArgs),
    /// Update an account's display fields
    Update(UpdateArgs),
    /// Remove an account and its stored credential
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Provider: openai, claude, or cursor
    pub provider: String,
    /// User-facing account name
    pub name: String,
    /// Authentication type: api_key, session, or manual
    #[arg(long, default_value = "api_key")]
    pub auth_type: String,
    /// Optional organisation / workspace scope
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Account id
    pub id: String,
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New organisation / workspace scope
    #[arg(long, conflicts_with = "clear_org")]
    pub org: Option<String>,
    /// Remove the organisation / workspace scope
    #[arg(long)]
    pub clear_org: bool,
    /// Enable scheduled syncing
    #[arg(long, conflicts_with = "disable_sync")]
    pub enable_sync: bool,
    /// Disable scheduled syncing
    #[arg(long)]
    pub disable_sync: bool,
    /// Per-account polling interval override in seconds
    #[arg(long, conflicts_with = "clear_interval")]
    pub interval: Option<u32>,
    /// Remove the per-account interval override
    #[arg(long)]
    pub clear_interval: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Account id
    pub id: String,
}

impl AccountsCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        match self {
            AccountsCommand::List => {
                let accounts = ctx.surface.list_accounts().await?;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(&accounts)?);
                    return Ok(());
                }

                if accounts.is_empty() {
                    formatter.info("No accounts configured. Run 'agentbattery accounts add' first.");
                    return Ok(());
                }

                let rows: Vec<Vec<String>> = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id().to_string(),
                            a.provider().as_str().to_string(),
                            a.display_name().to_string(),
                            a.auth_type().as_str().to_string(),
                            if a.sync_enabled() { "yes" } else { "no" }.to_string(),
                            a.status().as_str().to_string(),
                        ]
                    })
                    .collect();
                formatter.print_table(
                    &["ID", "PROVIDER", "NAME", "AUTH", "SYNC", "STATUS"],
                    &rows,
                );
            }
            AccountsCommand::Add(args) => {
                let provider: Provider = args.provider.parse()?;
                let auth_type: AuthType = args.auth_type.parse()?;

                let account = ctx
                    .surface
                    .create_account(provider, &args.name, auth_type, args.org.clone())
                    .await?;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(&account)?);
                } else {
                    formatter.success(&format!(
                        "Added {} account '{}' ({})",
                        provider.as_str(),
                        account.display_name(),
                        account.id()
                    ));
                    if auth_type != AuthType::Manual {
                        formatter.info(&format!(
                            "Store a credential with 'agentbattery credential set {}'",
                            account.id()
                        ));
                    }
                }
            }
            AccountsCommand::Update(args) => {
                let id: AccountId = args.id.parse()?;
                let patch = AccountPatch {
                    display_name: args.name.clone(),
                    org_workspace_id: if args.clear_org {
                        Some(None)
                    } else {
                        args.org.clone().map(Some)
                    },
                    sync_enabled: if args.enable_sync {
                        Some(true)
                    } else if args.disable_sync {
                        Some(false)
                    } else {
                        None
                    },
                    sync_interval_seconds: if args.clear_interval {
                        Some(None)
                    } else {
                        args.interval.map(Some)
                    },
                };

                let account = ctx.surface.update_account(&id, patch).await?;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(&account)?);
                } else {
                    formatter.success(&format!("Updated account '{}'", account.display_name()));
                }
            }
            AccountsCommand::Remove(args) => {
                let id: AccountId = args.id.parse()?;
                ctx.surface.delete_account(&id).await?;
                formatter.success(&format!("Removed account {}", id));
            }
        }
        Ok(())
    }
}
