//! Ordered message log for a single chat session.

use crate::message::Message;

/// Number of prior messages sent to the backend with each request.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Append-only transcript with a bounded view for outbound requests.
///
/// The only in-place edits are `replace_last` and `drop_last`, which exist to
/// resolve or roll back the pending "thinking" placeholder.
#[derive(Debug, Clone, Default)]
pub struct ConversationWindow {
    messages: Vec<Message>,
}

impl ConversationWindow {
    /// Create a log seeded with a greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(greeting)],
        }
    }

    /// Add a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get the final `n` messages in their original order.
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Replace the final message.
    ///
    /// # Panics
    ///
    /// Panics if the log is empty.
    pub fn replace_last(&mut self, message: Message) {
        match self.messages.last_mut() {
            Some(last) => *last = message,
            None => panic!("replace_last called on an empty conversation"),
        }
    }

    /// Remove the final message.
    ///
    /// # Panics
    ///
    /// Panics if the log is empty.
    pub fn drop_last(&mut self) {
        assert!(
            self.messages.pop().is_some(),
            "drop_last called on an empty conversation"
        );
    }

    /// Get all messages.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> ConversationWindow {
        let mut window = ConversationWindow::default();
        for i in 0..count {
            window.append(Message::user(format!("m{}", i)));
        }
        window
    }

    #[test]
    fn test_last_n_returns_tail_in_order() {
        let window = numbered(15);
        let tail = window.last_n(DEFAULT_HISTORY_WINDOW);

        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].content, "m5");
        assert_eq!(tail[9].content, "m14");
    }

    #[test]
    fn test_last_n_with_fewer_messages_returns_all() {
        let window = numbered(3);
        assert_eq!(window.last_n(10).len(), 3);
        assert_eq!(window.last_n(0).len(), 0);
    }

    #[test]
    fn test_replace_last() {
        let mut window = ConversationWindow::with_greeting("hi");
        window.append(Message::system("Thinking ..."));
        window.replace_last(Message::system("done"));

        assert_eq!(window.len(), 2);
        assert_eq!(window.last(), Some(&Message::system("done")));
    }

    #[test]
    fn test_drop_last() {
        let mut window = ConversationWindow::with_greeting("hi");
        window.append(Message::user("question"));
        window.drop_last();

        assert_eq!(window.messages(), &[Message::system("hi")]);
    }

    #[test]
    #[should_panic(expected = "empty conversation")]
    fn test_replace_last_on_empty_panics() {
        let mut window = ConversationWindow::default();
        window.replace_last(Message::system("nope"));
    }

    #[test]
    #[should_panic(expected = "empty conversation")]
    fn test_drop_last_on_empty_panics() {
        let mut window = ConversationWindow::default();
        window.drop_last();
    }
}
