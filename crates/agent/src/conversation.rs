use papyra_core::domain::chat::{ChatRole, Message};

/// Ordered transcript of one concierge session. Append-only while the
/// session lives; dropped with it.
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_customer(&mut self, text: impl Into<String>) {
        self.messages.push(Message::customer(text));
    }

    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.messages.push(Message::agent(text));
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.messages.push(Message::system(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent `window` dialogue turns, oldest first. System notices are
    /// transcript-only and never part of the model context.
    pub fn context_window(&self, window: usize) -> Vec<&Message> {
        let mut turns: Vec<&Message> = self
            .messages
            .iter()
            .rev()
            .filter(|message| message.role != ChatRole::System)
            .take(window)
            .collect();
        turns.reverse();
        turns
    }

    /// Last agent turn, if any. The confirmation gate checks it for the
    /// echoed document value.
    pub fn last_agent_turn(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|message| message.role == ChatRole::Agent)
    }
}

/// Keeps only the digits of a document string so that `123.456.789-00` and
/// `12345678900` compare equal.
pub fn document_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Finds a plausible tax-identifier token in free text: a token whose digit
/// count matches the short (11) or long (14) document form. Returns the
/// token as the customer typed it.
pub fn extract_document(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|ch: char| matches!(ch, ',' | ';' | ':' | '!' | '?')))
        .find(|token| {
            let digits = document_digits(token);
            let only_document_chars =
                token.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '/'));
            only_document_chars && matches!(digits.len(), 11 | 14)
        })
        .map(str::to_string)
}

const AFFIRMATIVE_WORDS: &[&str] =
    &["yes", "yep", "yeah", "confirm", "confirmed", "correct", "right", "exactly", "sure"];

const NEGATION_WORDS: &[&str] = &["no", "not", "nope", "wrong", "don't", "dont", "incorrect"];

/// Whether a customer turn reads as an explicit affirmation. Negations win
/// over affirmative words so "no, that's not right" never passes.
pub fn is_affirmative(text: &str) -> bool {
    let normalized = text.to_ascii_lowercase();
    let words: Vec<&str> = normalized
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '\'')
        .filter(|word| !word.is_empty())
        .collect();

    if words.iter().any(|word| NEGATION_WORDS.contains(word)) {
        return false;
    }

    words.iter().any(|word| AFFIRMATIVE_WORDS.contains(word))
}

#[cfg(test)]
mod tests {
    use papyra_core::domain::chat::{ChatRole, Message};

    use super::{document_digits, extract_document, is_affirmative, ConversationLog};

    #[test]
    fn context_window_trims_and_skips_system_notices() {
        let mut log = ConversationLog::new();
        for turn in 0..8 {
            log.push_customer(format!("customer {turn}"));
            log.push_agent(format!("agent {turn}"));
        }
        log.push_system("conversation transferred to support");

        let window = log.context_window(10);
        assert_eq!(window.len(), 10);
        assert!(window.iter().all(|message| message.role != ChatRole::System));
        assert_eq!(window.first().map(|m| m.text.as_str()), Some("customer 3"));
        assert_eq!(window.last().map(|m| m.text.as_str()), Some("agent 7"));
    }

    #[test]
    fn last_agent_turn_skips_newer_customer_messages() {
        let mut log = ConversationLog::new();
        log.push_agent("could you share your document?");
        log.push_customer("123.456.789-00");

        assert_eq!(
            log.last_agent_turn().map(|m| m.text.as_str()),
            Some("could you share your document?")
        );
        assert!(ConversationLog::from_messages(vec![Message::customer("hi")])
            .last_agent_turn()
            .is_none());
    }

    #[test]
    fn extracts_formatted_and_bare_documents() {
        assert_eq!(
            extract_document("sure, it is 123.456.789-00 thanks"),
            Some("123.456.789-00".to_string())
        );
        assert_eq!(extract_document("12345678900"), Some("12345678900".to_string()));
        assert_eq!(
            extract_document("company doc 12.345.678/0001-99,"),
            Some("12.345.678/0001-99".to_string())
        );
        assert_eq!(extract_document("call me at 555-1234"), None);
        assert_eq!(extract_document("where is my order?"), None);
    }

    #[test]
    fn document_digits_normalizes_formatting() {
        assert_eq!(document_digits("123.456.789-00"), "12345678900");
        assert_eq!(document_digits("12.345.678/0001-99"), "12345678000199");
    }

    #[test]
    fn affirmations_require_an_explicit_positive_word() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("Yes, I confirm."));
        assert!(is_affirmative("that's correct"));
        assert!(is_affirmative("exactly!"));

        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("no, that's not right"));
        assert!(!is_affirmative("123.456.789-00"));
        assert!(!is_affirmative("where is my order?"));
    }
}
