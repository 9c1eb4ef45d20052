//! Credential command - store and validate account secrets
//!
//! Secrets are read from stdin, never taken as command-line arguments,
//! so they stay out of shell history and the process table.

use std::io::Read;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use agentbattery_core::domain::AccountId;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum CredentialCommand {
    /// Store a credential for an account (reads the secret from stdin)
    Set(SetArgs),
    /// Validate the stored credential
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Account id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Account id
    pub id: String,
}

impl CredentialCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        match self {
            CredentialCommand::Set(args) => {
                let id: AccountId = args.id.parse()?;

                let mut secret = String::new();
                std::io::stdin()
                    .read_to_string(&mut secret)
                    .context("Failed to read secret from stdin")?;
                let secret = secret.trim_end_matches(['\r', '\n']);
                if secret.is_empty() {
                    anyhow::bail!("Refusing to store an empty credential");
                }

                ctx.surface.set_credential(&id, secret).await?;
                formatter.success("Credential stored");
            }
            CredentialCommand::Validate(args) => {
                let id: AccountId = args.id.parse()?;
                let check = ctx.surface.validate_credential(&id).await?;

                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(&check)?);
                } else if check.valid {
                    formatter.success("Credential is valid");
                    if let Some(expires_at) = check.expires_at {
                        formatter.info(&format!("Expires at {}", expires_at.to_rfc3339()));
                    }
                } else {
                    formatter.error("Credential is invalid");
                }
            }
        }
        Ok(())
    }
}
