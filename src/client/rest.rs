//! REST transport contract and the wire types that cross it.
//!
//! The transport itself (authentication, rate limiting, retries) is owned by
//! an external collaborator; this layer only defines the calls the
//! synchronizer needs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::commands::{CommandOption, CommandType};
use crate::error::HttpError;

/// Subset of the command endpoints used for registration.
///
/// All calls may fail with [`HttpError::Forbidden`]; the synchronizer's
/// per-guild failure policy depends on distinguishing it.
#[async_trait]
pub trait Http: Send + Sync {
    async fn get_global_commands(&self, app_id: u64) -> Result<Vec<CommandPayload>, HttpError>;

    async fn bulk_upsert_global_commands(
        &self,
        app_id: u64,
        payloads: Vec<CommandPayload>,
    ) -> Result<Vec<CommandPayload>, HttpError>;

    async fn bulk_upsert_guild_commands(
        &self,
        app_id: u64,
        guild_id: u64,
        payloads: Vec<CommandPayload>,
    ) -> Result<Vec<CommandPayload>, HttpError>;

    async fn bulk_upsert_command_permissions(
        &self,
        app_id: u64,
        guild_id: u64,
        payloads: Vec<CommandPermissions>,
    ) -> Result<(), HttpError>;

    async fn application_info(&self) -> Result<ApplicationInfo, HttpError>;
}

/// Wire form of a command, used both as the upsert payload and as the
/// record the remote store returns. `id` is absent on create payloads; the
/// remote always fills it in on returned records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default = "default_true")]
    pub default_permission: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
}

fn default_true() -> bool {
    true
}

/// Permission overwrite target type on the wire.
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum PermissionKind {
    Role = 1,
    User = 2,
}

/// A single resolved allow/deny record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionData {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: PermissionKind,
    pub permission: bool,
}

/// Permission overwrites for one command in one guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandPermissions {
    /// Remote id of the command the overwrites apply to
    pub id: u64,
    pub permissions: Vec<PermissionData>,
}

/// Owner information fetched from the application-info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub owner_id: u64,
    /// Team member ids for team-owned applications; empty otherwise
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_member_ids: Vec<u64>,
}

impl ApplicationInfo {
    /// Ids an `Owner` permission target expands to: every team member for a
    /// team-owned application, otherwise the single owner.
    pub fn owner_ids(&self) -> Vec<u64> {
        if self.team_member_ids.is_empty() {
            vec![self.owner_id]
        } else {
            self.team_member_ids.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_omits_id() {
        let payload = CommandPayload {
            id: None,
            kind: CommandType::Slash,
            name: "ping".to_string(),
            description: "Ping the bot".to_string(),
            options: Vec::new(),
            default_permission: true,
            guild_id: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("\"id\""), "id must be omitted when unset");
        assert!(json.contains("\"type\":1"));
    }

    #[test]
    fn returned_record_parses_with_defaults() {
        let record: CommandPayload =
            serde_json::from_str(r#"{"id": 42, "type": 1, "name": "ping"}"#).unwrap();
        assert_eq!(record.id, Some(42));
        assert!(record.default_permission);
        assert!(record.options.is_empty());
    }

    #[test]
    fn permission_kind_serializes_numeric() {
        let data = PermissionData {
            id: 7,
            kind: PermissionKind::Role,
            permission: true,
        };
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"{"id":7,"type":1,"permission":true}"#
        );
    }

    #[test]
    fn owner_ids_expand_teams() {
        let solo = ApplicationInfo {
            owner_id: 1,
            team_member_ids: Vec::new(),
        };
        assert_eq!(solo.owner_ids(), vec![1]);

        let team = ApplicationInfo {
            owner_id: 1,
            team_member_ids: vec![2, 3, 4],
        };
        assert_eq!(team.owner_ids(), vec![2, 3, 4]);
    }
}
