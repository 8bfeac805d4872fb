use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a conversation turn. The system role carries notices such as
/// handover confirmations; it is never sent to the model as dialogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Customer,
    Agent,
    System,
}

/// One turn in a concierge session. Messages are append-only within a
/// session and live only as long as the session does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), role, text: text.into(), timestamp: Utc::now() }
    }

    pub fn customer(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Customer, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Agent, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(ChatRole::System, text)
    }
}
