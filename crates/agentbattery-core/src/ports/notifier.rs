//! Notification delivery port (driven/secondary port)
//!
//! Fire-and-forget "show this message" delivery. There is no delivery
//! confirmation and no retry; a failed display is invisible to the
//! orchestrator. Dedup/cooldown policy is NOT this port's concern - the
//! notification gate in the sync crate decides whether to call it.

/// Port trait for user-facing notification delivery
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Shows a notification to the user
    ///
    /// Implementations should swallow platform errors after logging
    /// them; the caller treats delivery as best-effort.
    async fn show(&self, title: &str, body: &str) -> anyhow::Result<()>;
}
