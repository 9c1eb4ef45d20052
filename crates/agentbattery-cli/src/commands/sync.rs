//! Sync command - trigger an immediate sync of one account

use anyhow::Result;
use clap::Args;

use agentbattery_core::domain::{AccountId, SyncOutcome};
use agentbattery_sync::SyncAttempt;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Account id
    pub id: String,
}

impl SyncCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        let id: AccountId = self.id.parse()?;
        let attempt = ctx.surface.manual_sync(&id, None).await?;

        match attempt {
            SyncAttempt::Completed(SyncOutcome::Success) => {
                formatter.success("Sync completed");
            }
            SyncAttempt::Completed(SyncOutcome::Failure) => {
                formatter.error("Sync failed; see 'agentbattery runs' for details");
            }
            SyncAttempt::SkippedBackoff => {
                formatter.info("Sync skipped: the account is backing off after failures");
            }
            SyncAttempt::SkippedInFlight => {
                formatter.info("Sync skipped: another sync of this account is in progress");
            }
            SyncAttempt::SkippedDisabled => {
                formatter.info("Sync skipped: syncing is disabled for this account");
            }
            SyncAttempt::SkippedNoAdapter => {
                formatter.error("Sync skipped: no adapter available for this provider");
            }
        }
        Ok(())
    }
}
