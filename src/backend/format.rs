//! Conversion from the in-memory transcript to the backend wire schema.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// Role encoding understood by the backend.
///
/// On the wire each role is a single-key object with a null value,
/// `{"user":null}` or `{"system":null}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireRole {
    User,
    System,
}

impl WireRole {
    /// The object key used for this role.
    pub const fn tag(&self) -> &'static str {
        match self {
            WireRole::User => "user",
            WireRole::System => "system",
        }
    }
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            Role::System => WireRole::System,
        }
    }
}

impl Serialize for WireRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.tag(), &())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for WireRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum Tagged {
            User(()),
            System(()),
        }

        match Tagged::deserialize(deserializer) {
            Ok(Tagged::User(())) => Ok(WireRole::User),
            Ok(Tagged::System(())) => Ok(WireRole::System),
            Err(e) => Err(de::Error::custom(format!("unknown role tag: {}", e))),
        }
    }
}

/// A message in backend wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.into(),
            content: message.content.clone(),
        }
    }
}

/// Map messages to wire format, preserving order.
pub fn to_wire_format(messages: &[Message]) -> Vec<WireMessage> {
    messages.iter().map(WireMessage::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_map_one_to_one() {
        let wire = to_wire_format(&[
            Message::system("greeting"),
            Message::user("question"),
            Message::system("answer"),
        ]);

        let roles: Vec<WireRole> = wire.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![WireRole::System, WireRole::User, WireRole::System]);
        assert_eq!(wire[1].content, "question");
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(to_wire_format(&[]).is_empty());
    }

    #[test]
    fn test_wire_message_serialization() {
        let msg = WireMessage::from(&Message::user("Hello!"));
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":{"user":null},"content":"Hello!"}"#);

        let msg = WireMessage::from(&Message::system("Hi"));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":{"system":null}"#));
    }

    #[test]
    fn test_wire_message_deserialization() {
        let json = r#"{"role":{"system":null},"content":"ok"}"#;
        let msg: WireMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, WireRole::System);
        assert_eq!(msg.content, "ok");
    }

    #[test]
    fn test_unknown_role_tag_is_rejected() {
        let json = r#"{"role":{"assistant":null},"content":"ok"}"#;
        let result: Result<WireMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
