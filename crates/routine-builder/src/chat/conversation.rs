// Conversation history and outbound message assembly.

use crate::catalog::Product;

use super::prompt;
use super::ChatMessage;

/// A request ready to send. Owns its messages, so later changes to the
/// selection or the history do not affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTurn {
    /// The new user message, committed with the reply on success.
    pub user: ChatMessage,
    /// `[system] + history + user`, as sent.
    pub messages: Vec<ChatMessage>,
}

/// Committed user/assistant turns. The system preamble is not stored.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    history: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a turn for free-text `input`. Returns `None` when the input is
    /// empty after trimming.
    pub fn prepare(&self, input: &str, selection: &[Product]) -> Option<OutboundTurn> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        Some(self.build(ChatMessage::user(text), selection))
    }

    /// Build a routine-generation turn. Returns `None` when nothing is
    /// selected.
    pub fn prepare_routine(&self, selection: &[Product]) -> Option<OutboundTurn> {
        if selection.is_empty() {
            return None;
        }
        let user = ChatMessage::user(prompt::routine_prompt(selection));
        Some(self.build(user, selection))
    }

    fn build(&self, user: ChatMessage, selection: &[Product]) -> OutboundTurn {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(prompt::system_prompt(selection)));
        messages.extend(self.history.iter().cloned());
        messages.push(user.clone());
        OutboundTurn { user, messages }
    }

    /// Record a completed exchange.
    pub fn commit(&mut self, user: ChatMessage, reply: impl Into<String>) {
        self.history.push(user);
        self.history.push(ChatMessage::assistant(reply));
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductId;
    use crate::chat::Role;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            brand: "Brand".to_string(),
            category: "serum".to_string(),
            description: "desc".to_string(),
            image: String::new(),
        }
    }

    #[test]
    fn blank_input_prepares_nothing() {
        let conversation = Conversation::new();
        assert!(conversation.prepare("", &[]).is_none());
        assert!(conversation.prepare("   \n\t ", &[]).is_none());
    }

    #[test]
    fn first_turn_embeds_selection_in_preamble() {
        let conversation = Conversation::new();
        let turn = conversation
            .prepare("  what is this?  ", &[product(1, "Vitamin C Serum")])
            .unwrap();

        assert_eq!(turn.messages.len(), 2);
        assert_eq!(turn.messages[0].role, Role::System);
        assert!(turn.messages[0].content.contains("Vitamin C Serum"));
        assert_eq!(turn.messages[1], ChatMessage::user("what is this?"));
        assert_eq!(turn.user, ChatMessage::user("what is this?"));
    }

    #[test]
    fn later_turns_carry_history_and_current_selection() {
        let mut conversation = Conversation::new();
        let first = conversation.prepare("hi", &[product(1, "Serum")]).unwrap();
        conversation.commit(first.user, "hello!");

        let second = conversation.prepare("more", &[product(2, "Toner")]).unwrap();
        assert_eq!(second.messages.len(), 4);
        assert_eq!(
            second.messages[0],
            ChatMessage::system(prompt::system_prompt(&[product(2, "Toner")]))
        );
        assert_eq!(second.messages[1], ChatMessage::user("hi"));
        assert_eq!(second.messages[2], ChatMessage::assistant("hello!"));
        assert_eq!(second.messages[3], ChatMessage::user("more"));
        assert!(!second.messages[0].content.contains("- Serum"));
    }

    #[test]
    fn selection_made_after_first_turn_reaches_next_request() {
        let mut conversation = Conversation::new();
        let first = conversation.prepare("hello", &[]).unwrap();
        assert!(first.messages[0].content.contains("not selected any products"));
        conversation.commit(first.user, "Hi! Pick some products to get started.");

        let second = conversation
            .prepare(
                "what do you think of my selection?",
                &[product(3, "Retinol Serum")],
            )
            .unwrap();
        assert!(second
            .messages
            .iter()
            .any(|m| m.content.contains("Retinol Serum")));
        assert!(!second.messages[0].content.contains("not selected any products"));
    }

    #[test]
    fn preparing_does_not_change_history() {
        let conversation = Conversation::new();
        let _ = conversation.prepare("hi", &[]);
        assert!(conversation.is_empty());
    }

    #[test]
    fn turn_owns_its_snapshot() {
        let mut selection = vec![product(1, "Serum")];
        let conversation = Conversation::new();
        let turn = conversation.prepare("hi", &selection).unwrap();
        selection.clear();
        assert!(turn.messages[0].content.contains("Serum"));
    }

    #[test]
    fn routine_requires_selection() {
        let conversation = Conversation::new();
        assert!(conversation.prepare_routine(&[]).is_none());

        let turn = conversation
            .prepare_routine(&[product(1, "Serum"), product(2, "Toner")])
            .unwrap();
        assert!(turn.user.content.contains("- Serum by Brand"));
        assert!(turn.user.content.contains("- Toner by Brand"));
    }

    #[test]
    fn commit_appends_user_then_assistant() {
        let mut conversation = Conversation::new();
        conversation.commit(ChatMessage::user("q"), "a");
        assert_eq!(
            conversation.history(),
            &[ChatMessage::user("q"), ChatMessage::assistant("a")]
        );
    }
}
