use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use papyra_core::config::AlertConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertChannel {
    Email,
    Whatsapp,
}

impl AlertChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
        }
    }
}

/// Delivery seam for the external alert provider. Papyra only cares whether
/// the attempt succeeded.
#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, channel: AlertChannel, recipient: &str, message: &str) -> bool;
}

#[async_trait]
impl<T> AlertSender for std::sync::Arc<T>
where
    T: AlertSender + ?Sized,
{
    async fn send(&self, channel: AlertChannel, recipient: &str, message: &str) -> bool {
        (**self).send(channel, recipient, message).await
    }
}

/// Default provider: records the delivery in the log. A real email/WhatsApp
/// provider slots in behind the same trait.
#[derive(Default)]
pub struct LogAlertSender;

#[async_trait]
impl AlertSender for LogAlertSender {
    async fn send(&self, channel: AlertChannel, recipient: &str, message: &str) -> bool {
        if recipient.trim().is_empty() {
            warn!(channel = channel.as_str(), "alert skipped: no recipient configured");
            return false;
        }

        info!(
            event_name = "notify.alert.sent",
            channel = channel.as_str(),
            recipient,
            message,
            "system alert dispatched"
        );
        true
    }
}

/// Fans a store failure out to every enabled administrator channel.
///
/// One alert per failing operation per enabled channel; no retry, no
/// deduplication, no rate limiting. A burst of failures produces a burst of
/// alerts.
pub struct FailureNotifier<S = LogAlertSender> {
    config: AlertConfig,
    sender: S,
}

impl FailureNotifier<LogAlertSender> {
    pub fn new(config: AlertConfig) -> Self {
        Self::with_sender(config, LogAlertSender)
    }
}

impl<S> FailureNotifier<S>
where
    S: AlertSender,
{
    pub fn with_sender(config: AlertConfig, sender: S) -> Self {
        Self { config, sender }
    }

    /// Fire-and-forget: failures to deliver are logged, never propagated.
    pub async fn notify_failure(&self, operation: &str, error: &str) {
        let timestamp = Utc::now().to_rfc3339();
        let message = format!(
            "CRITICAL ALERT: operation `{operation}` against the shop database failed at \
             {timestamp}. Error: {error}. Check the store immediately."
        );

        if self.config.notify_email {
            let recipient = self.config.admin_email.as_deref().unwrap_or_default();
            if !self.sender.send(AlertChannel::Email, recipient, &message).await {
                warn!(operation, "email alert delivery failed");
            }
        }

        if self.config.notify_whatsapp {
            let recipient = self.config.admin_phone.as_deref().unwrap_or_default();
            if !self.sender.send(AlertChannel::Whatsapp, recipient, &message).await {
                warn!(operation, "whatsapp alert delivery failed");
            }
        }
    }
}
