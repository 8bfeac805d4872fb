use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use papyra_db::repositories::OrderRepository;

use crate::conversation::ConversationLog;
use crate::guardrails::{ConfirmationGate, GateDecision};
use crate::llm::{ChatModel, ContextMessage, LlmError, ModelTurn, ToolSpec};
use crate::tools::{OrderStatusTool, Tool, ORDER_STATUS_TOOL_NAME};

const CONTEXT_WINDOW: usize = 10;

/// Fixed replies for the two failure points of a turn. The conversation
/// degrades, it never crashes.
pub const MODEL_UNAVAILABLE_REPLY: &str =
    "I'm having a little trouble thinking right now. Please try again in a moment! \u{1F338}";
pub const TOOL_FOLLOW_UP_REPLY: &str =
    "I hit a technical snag while checking that. Could you try again?";

fn system_instruction() -> String {
    r#"You are "Pia", the virtual concierge of Papyra Stationery.

YOUR GOAL:
Help customers through sales, after-sales, order tracking, and support with
warmth and care.

YOUR GOLDEN RULES:
1. Tone: be kind and empathetic, and use gentle emojis (🌸, 🖊️, ✨, 📦).
2. Sales: when customers ask about products, suggest items from the shop.
   If they ask about shipping, say we deliver across the city quickly.
3. Tracking and orders (CRITICAL):
   - If the customer asks about "where is my order", "order status", or an
     invoice, you MUST identify them first.
   - STEP 1: politely ask for the CPF or CNPJ used on the purchase.
   - STEP 2: when the customer provides the number, repeat it back and ask
     them to confirm it before any lookup.
   - STEP 3: only after the customer answers "yes", "confirm", or "correct"
     may you use the checkOrderStatus tool.
   - NEVER invent an order status. Only report what the tool returns.
4. Problems/support: if the customer sounds upset, asks for a refund, or the
   tool finds nothing, apologize with empathy and suggest the "Talk to a
   human" option so a colleague can take over.
5. Privacy: never reveal another customer's data."#
        .to_string()
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model requested a tool during copy generation")]
    UnexpectedToolCall,
}

/// Orchestrates one concierge turn: route, gate, execute, compose.
pub struct Concierge {
    model: Arc<dyn ChatModel>,
    lookup: OrderStatusTool,
    gate: ConfirmationGate,
}

impl Concierge {
    pub fn new(model: Arc<dyn ChatModel>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { model, lookup: OrderStatusTool::new(orders), gate: ConfirmationGate }
    }

    /// Handles one customer turn and returns the agent reply text. `log`
    /// holds the prior turns; `new_text` is the incoming customer message.
    pub async fn handle_turn(&self, log: &ConversationLog, new_text: &str) -> String {
        let instruction = system_instruction();
        let tool_spec = ToolSpec::check_order_status();

        let mut context: Vec<ContextMessage> = log
            .context_window(CONTEXT_WINDOW)
            .into_iter()
            .filter_map(ContextMessage::from_transcript)
            .collect();
        context.push(ContextMessage::user(new_text));

        let turn = match self.model.generate(&instruction, &context, Some(&tool_spec)).await {
            Ok(turn) => turn,
            Err(error) => {
                warn!(error = %error, "model call failed; replying with fallback");
                return MODEL_UNAVAILABLE_REPLY.to_string();
            }
        };

        match turn {
            ModelTurn::Reply(text) => text,
            ModelTurn::ToolCall { name, arguments } if name == ORDER_STATUS_TOOL_NAME => {
                self.run_order_lookup(log, new_text, &instruction, &context, arguments).await
            }
            ModelTurn::ToolCall { name, .. } => {
                warn!(tool = %name, "model requested an undeclared tool");
                TOOL_FOLLOW_UP_REPLY.to_string()
            }
        }
    }

    async fn run_order_lookup(
        &self,
        log: &ConversationLog,
        new_text: &str,
        instruction: &str,
        context: &[ContextMessage],
        arguments: Value,
    ) -> String {
        let document =
            arguments.get("document").and_then(Value::as_str).unwrap_or_default().to_string();

        match self.gate.evaluate(log, new_text, &document) {
            GateDecision::Allow => {}
            GateDecision::Deny { reason_code, user_message } => {
                info!(reason_code, "order lookup blocked by confirmation gate");
                return user_message;
            }
        }

        info!("running order lookup for confirmed document");
        let result = match self
            .lookup
            .execute(serde_json::json!({ "document": document }))
            .await
        {
            Ok(result) => result,
            Err(error) => {
                warn!(error = %error, "order lookup tool rejected its input");
                return TOOL_FOLLOW_UP_REPLY.to_string();
            }
        };

        match self
            .model
            .continue_with_tool_result(instruction, context, ORDER_STATUS_TOOL_NAME, &result)
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                warn!(error = %error, "tool-result continuation failed");
                TOOL_FOLLOW_UP_REPLY.to_string()
            }
        }
    }

    /// Admin-side helper: drafts storefront copy for a product. Unlike chat
    /// turns, failures here surface to the caller.
    pub async fn generate_product_description(
        &self,
        product_name: &str,
        category: &str,
    ) -> Result<String, AgentError> {
        let prompt = format!(
            "Write a charming, creative, sales-oriented description for a stationery \
             product.\nProduct name: {product_name}\nCategory: {category}\n\nThe \
             description should be about two short paragraphs. Use a delightful, \
             organized tone."
        );

        let turn = self
            .model
            .generate(
                "You write product copy for Papyra Stationery's storefront.",
                &[ContextMessage::user(prompt)],
                None,
            )
            .await?;

        match turn {
            ModelTurn::Reply(text) => Ok(text),
            ModelTurn::ToolCall { .. } => Err(AgentError::UnexpectedToolCall),
        }
    }
}
