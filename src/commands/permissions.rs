//! Declarative command permissions and their sync-time resolution.
//!
//! Commands declare overwrites symbolically (role names, "owner"); concrete
//! ids are only known per guild and per application, so resolution happens
//! during registration sync.

use tracing::warn;

use crate::client::{Guild, PermissionData, PermissionKind};

use super::ApplicationCommand;

/// At most this many overwrites are upserted per command per guild; excess
/// entries are dropped in declaration order.
pub const MAX_OVERWRITES: usize = 10;

/// Target of a declared permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionTarget {
    Role(u64),
    /// Role referenced by name; resolved against each guild's role list.
    NamedRole(String),
    User(u64),
    /// The application owner, or every team member for team-owned
    /// applications.
    Owner,
}

/// A declared allow/deny overwrite attached to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPermission {
    pub target: PermissionTarget,
    pub allow: bool,
    /// Guild the overwrite applies to. When unset, the overwrite applies to
    /// every guild the command is scoped to.
    pub guild_id: Option<u64>,
}

impl CommandPermission {
    pub fn role(id: u64) -> Self {
        Self {
            target: PermissionTarget::Role(id),
            allow: true,
            guild_id: None,
        }
    }

    pub fn role_named(name: impl Into<String>) -> Self {
        Self {
            target: PermissionTarget::NamedRole(name.into()),
            allow: true,
            guild_id: None,
        }
    }

    pub fn user(id: u64) -> Self {
        Self {
            target: PermissionTarget::User(id),
            allow: true,
            guild_id: None,
        }
    }

    pub fn owner() -> Self {
        Self {
            target: PermissionTarget::Owner,
            allow: true,
            guild_id: None,
        }
    }

    /// Flip the overwrite to a deny record.
    pub fn deny(mut self) -> Self {
        self.allow = false;
        self
    }

    /// Pin the overwrite to a single guild.
    pub fn in_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }
}

/// Allow users holding the named role to use the command.
pub fn has_role(name: impl Into<String>) -> CommandPermission {
    CommandPermission::role_named(name)
}

/// Allow users holding any of the named roles.
pub fn has_any_role<I, S>(names: I) -> Vec<CommandPermission>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(CommandPermission::role_named).collect()
}

/// Allow a single user.
pub fn is_user(id: u64) -> CommandPermission {
    CommandPermission::user(id)
}

/// Allow the application owner (or every team member).
pub fn is_owner() -> CommandPermission {
    CommandPermission::owner()
}

/// Resolves symbolic permission targets to concrete overwrite records.
pub struct PermissionResolver<'a> {
    owners: &'a [u64],
}

impl<'a> PermissionResolver<'a> {
    pub fn new(owners: &'a [u64]) -> Self {
        Self { owners }
    }

    /// Resolve one declared overwrite against a guild. Unresolvable role
    /// names are dropped with a diagnostic; owner targets expand to one
    /// record per owner id.
    pub fn resolve(&self, permission: &CommandPermission, guild: &Guild) -> Vec<PermissionData> {
        match &permission.target {
            PermissionTarget::Role(id) => vec![PermissionData {
                id: *id,
                kind: PermissionKind::Role,
                permission: permission.allow,
            }],
            PermissionTarget::NamedRole(name) => match guild.role_named(name) {
                Some(role) => vec![PermissionData {
                    id: role.id,
                    kind: PermissionKind::Role,
                    permission: permission.allow,
                }],
                None => {
                    warn!(
                        "No role named {:?} in guild {}; dropping permission overwrite",
                        name, guild.id
                    );
                    Vec::new()
                }
            },
            PermissionTarget::User(id) => vec![PermissionData {
                id: *id,
                kind: PermissionKind::User,
                permission: permission.allow,
            }],
            PermissionTarget::Owner => self
                .owners
                .iter()
                .map(|id| PermissionData {
                    id: *id,
                    kind: PermissionKind::User,
                    permission: permission.allow,
                })
                .collect(),
        }
    }

    /// Resolve every overwrite a command declares for `guild`, preserving
    /// declaration order and truncating to [`MAX_OVERWRITES`].
    pub fn resolve_command(
        &self,
        command: &ApplicationCommand,
        guild: &Guild,
    ) -> Vec<PermissionData> {
        let mut resolved = Vec::new();
        for permission in command.permissions() {
            if !applies_to(permission, command, guild.id) {
                continue;
            }
            resolved.extend(self.resolve(permission, guild));
        }
        if resolved.len() > MAX_OVERWRITES {
            warn!(
                "Command {} declares {} overwrites for guild {}; keeping the first {}",
                command.name(),
                resolved.len(),
                guild.id,
                MAX_OVERWRITES
            );
            resolved.truncate(MAX_OVERWRITES);
        }
        resolved
    }
}

/// An overwrite applies to a guild when pinned to it, or when it is unpinned
/// and the command itself is scoped to that guild.
fn applies_to(permission: &CommandPermission, command: &ApplicationCommand, guild_id: u64) -> bool {
    match permission.guild_id {
        Some(id) => id == guild_id,
        None => command.is_scoped_to(guild_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Role;
    use crate::commands::slash_command;

    fn guild() -> Guild {
        Guild {
            id: 100,
            name: "test".to_string(),
            roles: vec![
                Role {
                    id: 7,
                    name: "mod".to_string(),
                },
                Role {
                    id: 8,
                    name: "admin".to_string(),
                },
            ],
        }
    }

    fn command(permissions: Vec<CommandPermission>) -> ApplicationCommand {
        slash_command("ping")
            .description("Ping")
            .guild_ids([100])
            .permissions(permissions)
            .handler(|_ctx| async { Ok(()) })
            .unwrap()
    }

    #[test]
    fn named_role_resolves_by_guild_lookup() {
        let resolver = PermissionResolver::new(&[]);
        let resolved = resolver.resolve(&has_role("admin"), &guild());
        assert_eq!(
            resolved,
            vec![PermissionData {
                id: 8,
                kind: PermissionKind::Role,
                permission: true,
            }]
        );
    }

    #[test]
    fn unresolvable_role_name_dropped() {
        let resolver = PermissionResolver::new(&[]);
        assert!(resolver.resolve(&has_role("nobody"), &guild()).is_empty());
    }

    #[test]
    fn owner_expands_to_team_members() {
        let owners = vec![1, 2, 3];
        let resolver = PermissionResolver::new(&owners);
        let resolved = resolver.resolve(&is_owner(), &guild());
        assert_eq!(resolved.len(), 3);
        assert!(resolved.iter().all(|p| p.kind == PermissionKind::User));
    }

    #[test]
    fn single_owner_resolves_to_one_entry() {
        let owners = vec![9];
        let resolver = PermissionResolver::new(&owners);
        assert_eq!(resolver.resolve(&is_owner(), &guild()).len(), 1);
    }

    #[test]
    fn truncation_keeps_first_ten_in_order() {
        let permissions: Vec<_> = (0..15).map(|i| CommandPermission::user(1000 + i)).collect();
        let cmd = command(permissions);
        let resolver = PermissionResolver::new(&[]);
        let resolved = resolver.resolve_command(&cmd, &guild());
        assert_eq!(resolved.len(), MAX_OVERWRITES);
        let ids: Vec<u64> = resolved.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1000..1010).collect::<Vec<u64>>());
    }

    #[test]
    fn pinned_overwrite_skipped_in_other_guilds() {
        let cmd = command(vec![
            CommandPermission::user(1).in_guild(999),
            CommandPermission::user(2),
        ]);
        let resolver = PermissionResolver::new(&[]);
        let resolved = resolver.resolve_command(&cmd, &guild());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, 2);
    }

    #[test]
    fn deny_record_carries_allow_false() {
        let resolver = PermissionResolver::new(&[]);
        let resolved = resolver.resolve(&is_user(5).deny(), &guild());
        assert!(!resolved[0].permission);
    }
}
