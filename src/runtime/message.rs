//! Messages exchanged between roles
//!
//! A message is an immutable unit of communication: content, a kind tag
//! identifying the action that produced it (or the user-input sentinel),
//! the producing role, and an optional causal parent for provenance.

use serde::{Deserialize, Serialize};

/// Identity of a published message, stamped by the bus
///
/// Ids are strictly increasing in publish order; `UNSET` marks a draft
/// that has not been through the bus yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Marker for a message that has not been published
    pub const UNSET: MessageId = MessageId(0);
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Logical kind of a message
///
/// Either the name of the action that produced it, or the sentinel
/// user-input kind for seed instructions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKind(String);

/// Kind tag for driver-supplied instructions
pub const USER_INPUT_KIND: &str = "user_input";

impl MessageKind {
    /// Create a kind from an action name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The sentinel kind for user instructions
    pub fn user_input() -> Self {
        Self(USER_INPUT_KIND.to_string())
    }

    /// Whether this is the user-input sentinel
    pub fn is_user_input(&self) -> bool {
        self.0 == USER_INPUT_KIND
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An immutable unit of inter-role communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Bus-assigned id; `MessageId::UNSET` until published
    pub id: MessageId,
    /// Kind tag: producing action's name, or the user-input sentinel
    pub kind: MessageKind,
    /// Text content
    pub content: String,
    /// Identity of the producing role ("user" for seed instructions)
    pub producer_role: String,
    /// The message that triggered this one, if any
    pub causal_parent: Option<MessageId>,
}

impl Message {
    /// Create a draft user-instruction message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::UNSET,
            kind: MessageKind::user_input(),
            content: content.into(),
            producer_role: "user".to_string(),
            causal_parent: None,
        }
    }

    /// Create a draft message for an action's output
    pub fn action_output(
        kind: MessageKind,
        content: impl Into<String>,
        producer_role: impl Into<String>,
        causal_parent: Option<MessageId>,
    ) -> Self {
        Self {
            id: MessageId::UNSET,
            kind,
            content: content.into(),
            producer_role: producer_role.into(),
            causal_parent,
        }
    }

    /// Whether this message has been stamped by the bus
    pub fn is_published(&self) -> bool {
        self.id != MessageId::UNSET
    }
}
