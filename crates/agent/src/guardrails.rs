use crate::conversation::{document_digits, is_affirmative, ConversationLog};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String },
}

/// Deterministic gate in front of the order-lookup tool.
///
/// The tool may only run when the current customer turn affirms a document
/// value that the agent echoed back in its immediately preceding turn. The
/// model is told the same policy in its instructions, but the gate is the
/// authority: a premature or fabricated tool call degrades to a clarifying
/// reply instead of a lookup.
#[derive(Clone, Debug, Default)]
pub struct ConfirmationGate;

impl ConfirmationGate {
    pub fn evaluate(
        &self,
        log: &ConversationLog,
        new_customer_text: &str,
        requested_document: &str,
    ) -> GateDecision {
        let requested_digits = document_digits(requested_document);
        if !matches!(requested_digits.len(), 11 | 14) {
            return GateDecision::Deny {
                reason_code: "malformed_document",
                user_message: "I could not read that document number. Could you share the \
                     CPF or CNPJ used on the purchase? \u{1F338}"
                    .to_string(),
            };
        }

        if !is_affirmative(new_customer_text) {
            return GateDecision::Deny {
                reason_code: "confirmation_missing",
                user_message: format!(
                    "Just to be safe: do you confirm the document is {requested_document}?"
                ),
            };
        }

        let echoed = log
            .last_agent_turn()
            .map(|message| document_digits(&message.text).contains(&requested_digits))
            .unwrap_or(false);
        if !echoed {
            return GateDecision::Deny {
                reason_code: "document_not_presented",
                user_message: "Before I check, could you share the CPF or CNPJ used on the \
                     purchase? \u{1F338}"
                    .to_string(),
            };
        }

        GateDecision::Allow
    }
}
