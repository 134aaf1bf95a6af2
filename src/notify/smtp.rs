//! SMTP notifier — emails the admin when the review pipeline fails.
//!
//! Sending happens on a blocking worker thread since the SMTP transport is
//! synchronous. Every failure mode (unparseable addresses, connection
//! errors, rejected mail) is logged and swallowed: a broken mail setup must
//! never take the webhook path down with it.

use crate::config::NotifyConfig;
use crate::notify::Notifier;
use anyhow::Result;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info, warn};

const FALLBACK_FROM: &str = "reviewd@localhost";

pub struct SmtpNotifier {
    config: NotifyConfig,
}

impl SmtpNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_admin(&self, subject: &str, body: &str) -> Result<()> {
        if self.config.admin_email.trim().is_empty() {
            warn!("admin email is not configured; skipping notification");
            return Ok(());
        }

        let config = self.config.clone();
        let subject = subject.to_owned();
        let body = format!("{body}\n\nTimestamp: {}", chrono::Utc::now().to_rfc3339());

        let send = tokio::task::spawn_blocking(move || send_mail(&config, &subject, &body)).await;
        match send {
            Ok(Ok(())) => info!(to = %self.config.admin_email, "sent admin notification"),
            Ok(Err(err)) => error!("failed to send admin notification: {err:#}"),
            Err(err) => error!(err = %err, "notification task panicked"),
        }
        Ok(())
    }
}

fn send_mail(config: &NotifyConfig, subject: &str, body: &str) -> Result<()> {
    let to: Mailbox = config.admin_email.parse()?;
    let from: Mailbox = if config.from_email.trim().is_empty() {
        FALLBACK_FROM.parse()?
    } else {
        config.from_email.parse()?
    };

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .body(body.to_owned())?;

    let mut builder = SmtpTransport::relay(&config.smtp_host)?.port(config.smtp_port);
    if !config.smtp_username.is_empty() {
        builder = builder.credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ));
    }
    builder.build().send(&message)?;
    Ok(())
}
