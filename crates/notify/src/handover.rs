use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use papyra_core::config::WebhookConfig;
use papyra_core::domain::chat::Message;

/// Envelope POSTed when an automated conversation is transferred to a human
/// department.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandoverPayload {
    pub event: &'static str,
    pub timestamp: String,
    pub department: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub history: Vec<Message>,
}

impl HandoverPayload {
    pub fn new(department: impl Into<String>, session_id: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            event: "chat_handover",
            timestamp: Utc::now().to_rfc3339(),
            department: department.into(),
            session_id: session_id.into(),
            history,
        }
    }
}

/// Posts handover envelopes to the configured sink. Success is a 2xx
/// response; there is no retry.
pub struct HandoverDispatcher {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl HandoverDispatcher {
    pub fn new(client: reqwest::Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }

    pub async fn dispatch(&self, payload: &HandoverPayload) -> bool {
        if !self.config.enabled {
            warn!(
                department = %payload.department,
                "handover webhook is disabled; conversation stays with the concierge"
            );
            return false;
        }

        info!(
            event_name = "notify.handover.dispatch",
            department = %payload.department,
            session_id = %payload.session_id,
            url = %self.config.handover_url,
            "sending chat handover"
        );

        match self.client.post(&self.config.handover_url).json(payload).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    status = response.status().as_u16(),
                    "handover webhook rejected the payload"
                );
                false
            }
            Err(error) => {
                warn!(error = %error, "handover webhook dispatch failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use papyra_core::config::WebhookConfig;
    use papyra_core::domain::chat::Message;

    use super::{HandoverDispatcher, HandoverPayload};

    #[test]
    fn payload_serializes_with_the_expected_envelope() {
        let payload = HandoverPayload::new(
            "Support",
            "session-1",
            vec![Message::customer("Where is my order?"), Message::agent("Let me check! \u{1F338}")],
        );

        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["event"], "chat_handover");
        assert_eq!(json["department"], "Support");
        assert_eq!(json["sessionId"], "session-1");
        assert_eq!(json["history"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["history"][0]["role"], "customer");
        assert!(json["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn disabled_webhook_short_circuits_without_network() {
        let dispatcher = HandoverDispatcher::new(
            reqwest::Client::new(),
            WebhookConfig { enabled: false, handover_url: "https://unreachable.example".into() },
        );

        let payload = HandoverPayload::new("Sales", "session-2", Vec::new());
        assert!(!dispatcher.dispatch(&payload).await);
    }

    #[tokio::test]
    async fn unreachable_sink_reports_failure_instead_of_erroring() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .expect("client");
        let dispatcher = HandoverDispatcher::new(
            client,
            WebhookConfig {
                enabled: true,
                // Reserved TEST-NET address: nothing answers there.
                handover_url: "http://192.0.2.1:9/handover".into(),
            },
        );

        let payload = HandoverPayload::new("Financial", "session-3", Vec::new());
        assert!(!dispatcher.dispatch(&payload).await);
    }
}
