//! Snapshots command - usage history for one account

use anyhow::Result;
use clap::Args;

use agentbattery_core::domain::AccountId;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct SnapshotsCommand {
    /// Account id
    pub id: String,
    /// Maximum rows to show (server cap: 100)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl SnapshotsCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        let id: AccountId = self.id.parse()?;
        let snapshots = ctx.surface.list_snapshots(&id, self.limit).await?;

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::to_value(&snapshots)?);
            return Ok(());
        }

        if snapshots.is_empty() {
            formatter.info("No snapshots recorded for this account yet.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = snapshots
            .iter()
            .map(|s| {
                vec![
                    s.fetched_at.to_rfc3339(),
                    format!("{:.0}%", s.battery_percent),
                    s.usage_summary(),
                    s.source.as_str().to_string(),
                    s.confidence.as_str().to_string(),
                ]
            })
            .collect();
        formatter.print_table(
            &["FETCHED AT", "BATTERY", "USAGE", "SOURCE", "CONFIDENCE"],
            &rows,
        );
        Ok(())
    }
}
