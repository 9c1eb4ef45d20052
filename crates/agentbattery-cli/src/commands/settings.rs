//! Settings command - view and change application settings

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::CliContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,
    /// Change one or more settings
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Battery percentage at or below which a low-battery alert fires (1-99)
    #[arg(long)]
    pub low_battery_threshold: Option<u8>,
    /// Consecutive failures before a sync warning fires (>= 1)
    #[arg(long)]
    pub failure_threshold: Option<u32>,
    /// Default polling interval in seconds (>= 30)
    #[arg(long)]
    pub polling_interval: Option<u32>,
    /// Enable or disable debug logging
    #[arg(long)]
    pub debug_logs: Option<bool>,
}

impl SettingsCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(matches!(format, OutputFormat::Json));
        let ctx = CliContext::open().await?;

        match self {
            SettingsCommand::Show => {
                let settings = ctx.surface.get_settings().await?;
                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(settings)?);
                } else {
                    formatter.info(&format!(
                        "Low battery threshold:     {}%",
                        settings.low_battery_threshold_percent
                    ));
                    formatter.info(&format!(
                        "Failure alert threshold:   {}",
                        settings.persistent_failure_threshold
                    ));
                    formatter.info(&format!(
                        "Default polling interval:  {}s",
                        settings.default_polling_interval_seconds
                    ));
                    formatter.info(&format!(
                        "Debug logs:                {}",
                        settings.debug_logs_enabled
                    ));
                }
            }
            SettingsCommand::Set(args) => {
                let mut settings = ctx.surface.get_settings().await?;
                if let Some(threshold) = args.low_battery_threshold {
                    settings.low_battery_threshold_percent = threshold;
                }
                if let Some(threshold) = args.failure_threshold {
                    settings.persistent_failure_threshold = threshold;
                }
                if let Some(interval) = args.polling_interval {
                    settings.default_polling_interval_seconds = interval;
                }
                if let Some(debug) = args.debug_logs {
                    settings.debug_logs_enabled = debug;
                }

                let updated = ctx.surface.update_settings(settings).await?;
                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::to_value(updated)?);
                } else {
                    formatter.success("Settings updated");
                }
            }
        }
        Ok(())
    }
}
