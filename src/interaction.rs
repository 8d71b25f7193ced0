//! Inbound interaction events received from the gateway collaborator.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Interaction type discriminant as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    Autocomplete = 4,
    ModalSubmit = 5,
}

/// An inbound event representing a user invoking a command or UI component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub id: u64,
    pub application_id: u64,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u64>,
    pub user_id: u64,
    /// Token used by outer layers to acknowledge the interaction
    pub token: String,
}

impl Interaction {
    /// Parse a raw gateway payload.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Command-specific portion of an interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionData {
    /// Remote id of the invoked command
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,
    /// Target of a user/message context menu invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<u64>,
}

/// A supplied option value. Subcommand entries carry nested `options`
/// instead of a `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionValue {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionValue>,
    /// Set on the option the user is currently typing in an autocomplete
    /// interaction
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub focused: bool,
}

impl OptionValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            options: Vec::new(),
            focused: false,
        }
    }

    /// A subcommand entry wrapping nested option values.
    pub fn subcommand(name: impl Into<String>, options: Vec<OptionValue>) -> Self {
        Self {
            name: name.into(),
            value: None,
            options,
            focused: false,
        }
    }
}

/// Raw option value.
///
/// Snowflake-valued options (user/channel/role/mentionable/attachment)
/// arrive as string snowflakes; use the `as_*_id` accessors to decode them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_snowflake(&self) -> Option<u64> {
        match self {
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_user_id(&self) -> Option<u64> {
        self.as_snowflake()
    }

    pub fn as_channel_id(&self) -> Option<u64> {
        self.as_snowflake()
    }

    pub fn as_role_id(&self) -> Option<u64> {
        self.as_snowflake()
    }
}
