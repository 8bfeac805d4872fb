//! Outbound notifications: administrator failure alerts and the chat
//! handover webhook.

pub mod alerts;
pub mod handover;

pub use alerts::{AlertChannel, AlertSender, FailureNotifier, LogAlertSender};
pub use handover::{HandoverDispatcher, HandoverPayload};
