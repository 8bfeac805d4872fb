//! Customer Concierge - conversational order lookup and storefront copy
//!
//! This crate is the conversational side of papyra. It holds:
//! - Conversation state for a single chat session (`conversation`)
//! - The confirmation gate that protects the order-lookup tool (`guardrails`)
//! - The generative model client and its wire types (`llm`)
//! - Tool execution against the order store (`tools`)
//! - Turn orchestration and fallback behavior (`runtime`)
//!
//! # Architecture
//!
//! A turn flows through a single linear pipeline:
//! 1. The session transcript is trimmed to a small context window.
//! 2. The model routes the turn: plain reply or a `checkOrderStatus` call.
//! 3. A requested tool call must pass the deterministic confirmation gate.
//! 4. The tool queries the order store read-only; its result goes back to
//!    the model, which composes the final reply.
//!
//! # Safety Principle
//!
//! The model is a router and a copywriter. Whether the lookup tool may run
//! is decided by the gate, never by the model: the tool executes only when
//! the customer has just affirmed a document the agent echoed back to them.

pub mod conversation;
pub mod guardrails;
pub mod llm;
pub mod runtime;
pub mod tools;

pub use conversation::ConversationLog;
pub use guardrails::{ConfirmationGate, GateDecision};
pub use llm::{ChatModel, ContextMessage, GeminiModel, LlmError, ModelTurn, ToolSpec};
pub use runtime::{AgentError, Concierge};
pub use tools::{OrderStatusTool, Tool, ToolRegistry, ORDER_STATUS_TOOL_NAME};
