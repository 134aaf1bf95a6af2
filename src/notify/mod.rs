//! Admin notifications for pipeline failures.

pub mod smtp;

use anyhow::Result;
use async_trait::async_trait;

pub use smtp::SmtpNotifier;

/// Best-effort notification channel to the operator.
///
/// Implementations swallow their own transport failures; the event processor
/// additionally guards against any `Err` escaping a notification attempt.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_admin(&self, subject: &str, body: &str) -> Result<()>;
}
