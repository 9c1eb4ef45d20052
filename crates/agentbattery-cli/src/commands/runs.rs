//! Runs command - sync attempt audit trail for one account

use anyhow::Result;
use clap::Args;

use agentbattery_core::domain::AccountId;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct RunsCommand {
    /// Account id
    pub id: String,
    /// Maximum rows to show (server cap: 50)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl RunsCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        let id: AccountId = self.id.parse()?;
        let runs = ctx.surface.list_sync_runs(&id, self.limit).await?;

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::to_value(&runs)?);
            return Ok(());
        }

        if runs.is_empty() {
            formatter.info("No sync runs recorded for this account yet.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = runs
            .iter()
            .map(|r| {
                vec![
                    r.started_at().to_rfc3339(),
                    if r.is_open() {
                        "running".to_string()
                    } else {
                        r.outcome().as_str().to_string()
                    },
                    r.attempts().to_string(),
                    r.error_code().unwrap_or("-").to_string(),
                    r.error_message().unwrap_or("-").to_string(),
                ]
            })
            .collect();
        formatter.print_table(
            &["STARTED AT", "OUTCOME", "ATTEMPT", "ERROR", "MESSAGE"],
            &rows,
        );
        Ok(())
    }
}
