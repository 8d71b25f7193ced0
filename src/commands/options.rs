//! Option schema for slash commands.
//!
//! Options are declared explicitly on the command builder; there is no
//! signature introspection. The structs double as the wire representation.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::interaction::Value;

/// Option value type discriminant as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl OptionType {
    pub fn is_numeric(self) -> bool {
        matches!(self, OptionType::Integer | OptionType::Number)
    }
}

/// Channel type filter values for channel options.
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelType {
    Text = 0,
    Dm = 1,
    Voice = 2,
    Category = 4,
    News = 5,
    Stage = 13,
    Forum = 15,
}

/// A fixed choice presented to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
}

/// A single command parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<ChannelType>,
    /// Nested options; only used by subcommand and subcommand-group entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    /// Create an option. Defaults to non-required with no choices.
    pub fn new(kind: OptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            channel_types: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn add_string_choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: Value::String(value.into()),
        });
        self
    }

    pub fn add_int_choice(mut self, name: impl Into<String>, value: i64) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: Value::Integer(value),
        });
        self
    }

    pub fn add_number_choice(mut self, name: impl Into<String>, value: f64) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: Value::Number(value),
        });
        self
    }

    /// Lower bound for integer/number options.
    pub fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Upper bound for integer/number options.
    pub fn max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Restrict a channel option to the given channel type.
    pub fn channel_type(mut self, channel_type: ChannelType) -> Self {
        self.channel_types.push(channel_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_skips_empty_fields() {
        let option = CommandOption::new(OptionType::String, "msg", "The message").required(true);
        let json = serde_json::to_string(&option).unwrap();
        assert_eq!(
            json,
            r#"{"type":3,"name":"msg","description":"The message","required":true}"#
        );
    }

    #[test]
    fn choices_serialize_in_order() {
        let option = CommandOption::new(OptionType::String, "mode", "Where to run")
            .add_string_choice("Local", "local")
            .add_string_choice("Cluster", "cluster");
        let json = serde_json::to_string(&option).unwrap();
        let local = json.find("local").unwrap();
        let cluster = json.find("cluster").unwrap();
        assert!(local < cluster);
    }

    #[test]
    fn numeric_kind_detection() {
        assert!(OptionType::Integer.is_numeric());
        assert!(OptionType::Number.is_numeric());
        assert!(!OptionType::String.is_numeric());
    }

    #[test]
    fn nested_options_roundtrip() {
        let sub = CommandOption::new(OptionType::SubCommand, "add", "Add a project");
        let mut group = CommandOption::new(OptionType::SubCommandGroup, "project", "Projects");
        group.options.push(sub);
        let json = serde_json::to_string(&group).unwrap();
        let back: CommandOption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, group);
    }
}
