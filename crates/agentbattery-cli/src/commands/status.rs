//! Status command - battery gauge across all accounts

use anyhow::Result;
use clap::Args;

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        let statuses = ctx.surface.battery_status().await?;

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&serde_json::to_value(&statuses)?);
            return Ok(());
        }

        if statuses.is_empty() {
            formatter.info("No accounts configured. Run 'agentbattery accounts add' first.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = statuses
            .iter()
            .map(|s| {
                vec![
                    s.display_name.clone(),
                    s.provider.as_str().to_string(),
                    format!("{:.0}%", s.battery_percent),
                    s.usage_summary.clone(),
                    s.last_sync_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string()),
                    s.health.as_str().to_string(),
                ]
            })
            .collect();
        formatter.print_table(
            &["ACCOUNT", "PROVIDER", "BATTERY", "USAGE", "LAST SYNC", "HEALTH"],
            &rows,
        );

        for status in &statuses {
            if let Some(ref error) = status.last_error {
                formatter.error(&format!("{}: {}", status.display_name, error));
            }
        }
        Ok(())
    }
}
