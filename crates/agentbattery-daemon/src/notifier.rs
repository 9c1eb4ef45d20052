//! Desktop notification delivery
//!
//! Implements the `INotifier` port with freedesktop notifications via
//! `notify-rust`. Display is best-effort; on systems without a
//! notification daemon every alert degrades to a log line.

use agentbattery_core::ports::INotifier;

/// Application name shown by the notification daemon
const APP_NAME: &str = "Agent Battery";

/// Shows alerts as desktop notifications
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for DesktopNotifier {
    async fn show(&self, title: &str, body: &str) -> anyhow::Result<()> {
        let title = title.to_string();
        let body = body.to_string();

        // notify-rust blocks on the D-Bus round trip.
        let result = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .appname(APP_NAME)
                .summary(&title)
                .body(&body)
                .show()
        })
        .await?;

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)),
        }
    }
}

/// Fallback notifier that only writes alerts to the log
///
/// Used when desktop notifications are disabled or unavailable.
pub struct LogNotifier;

#[async_trait::async_trait]
impl INotifier for LogNotifier {
    async fn show(&self, title: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(title, body, "Notification");
        Ok(())
    }
}
