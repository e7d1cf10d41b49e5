/// Represents who sent a message in the chat.
///
/// `System` covers both the assistant's replies and the opening greeting.
/// The backend only knows these two tags, so there is no separate
/// assistant variant; widen this enum if a third role is ever needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    System,
}

impl Role {
    /// Returns the display label for this role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::System => "Assistant",
        }
    }
}

/// A single message in the chat history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new system message (assistant reply, greeting or placeholder).
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}
