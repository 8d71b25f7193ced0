//! Error types for command construction, synchronization and dispatch.

use thiserror::Error;

/// Errors raised while running an application command.
///
/// Dispatch-time errors never escape the dispatcher; they are routed through
/// the command's error hooks and surfaced as a `CommandError` event.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The check functions attached to the command rejected the invocation.
    #[error("the check functions for command `{0}` failed")]
    CheckFailure(String),

    /// The bot's global check functions rejected the invocation.
    #[error("the global check functions for command `{0}` failed")]
    GlobalCheckFailure(String),

    /// A group interaction named a subcommand that is not registered.
    #[error("command `{0}` received no matching subcommand")]
    UnknownSubcommand(String),

    /// A user callback returned an error. Always carries the original.
    #[error("application command `{command}` raised an error: {source}")]
    Invoke {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CommandError {
    /// Whether this error came from a check rejection rather than the
    /// callback itself.
    pub fn is_check_failure(&self) -> bool {
        matches!(
            self,
            CommandError::CheckFailure(_) | CommandError::GlobalCheckFailure(_)
        )
    }
}

/// Marker error a callback returns to signal cooperative cancellation.
///
/// The invocation wrapper swallows it into [`Invocation::Cancelled`]; it is
/// never routed to error hooks or logged as a failure.
///
/// [`Invocation::Cancelled`]: crate::commands::Invocation
#[derive(Debug, Clone, Copy, Error)]
#[error("invocation cancelled")]
pub struct Cancelled;

/// Errors reported by the REST transport collaborator.
#[derive(Debug, Error)]
pub enum HttpError {
    /// 403 — the application lacks access to the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404 — the resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other Discord JSON error code.
    #[error("api error {code}: {message}")]
    Api { code: u32, message: String },

    /// Network or I/O failure on the client side.
    #[error("transport error: {0}")]
    Transport(String),
}

impl HttpError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, HttpError::Forbidden(_))
    }
}

/// Errors raised while reconciling local commands against the remote store.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch application info: {source}")]
    ApplicationInfo {
        #[source]
        source: HttpError,
    },

    #[error("bulk upsert of global commands failed: {source}")]
    Global {
        #[source]
        source: HttpError,
    },

    #[error("bulk upsert of commands for guild {guild_id} failed: {source}")]
    Guild {
        guild_id: u64,
        #[source]
        source: HttpError,
    },

    #[error("permission upsert for guild {guild_id} failed: {source}")]
    Permissions {
        guild_id: u64,
        #[source]
        source: HttpError,
    },
}

/// Construction-time errors. These are fatal at declaration, never deferred
/// to runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid command name `{0}`: slash command names must be 1-32 lowercase characters without spaces")]
    InvalidName(String),

    #[error("invalid description for command `{0}`: must be 1-100 characters")]
    InvalidDescription(String),

    #[error("context menu command `{0}` cannot declare options or a description")]
    InvalidContextMenu(String),

    #[error("command `{0}` declares an empty guild scope; omit guild_ids for a global command")]
    EmptyGuildScope(String),

    #[error("command `{0}` declares more than 25 options")]
    TooManyOptions(String),

    #[error("option `{option}` of command `{command}` declares more than 25 choices")]
    TooManyChoices { command: String, option: String },

    #[error("required option `{option}` of command `{command}` is declared after an optional one")]
    RequiredOptionAfterOptional { command: String, option: String },

    #[error("option `{option}` of command `{command}` declares min/max values on a non-numeric type")]
    InvalidRange { command: String, option: String },

    #[error("option `{option}` of command `{command}` declares channel types on a non-channel type")]
    InvalidChannelFilter { command: String, option: String },

    #[error("group `{0}` declares no subcommands")]
    EmptyGroup(String),

    #[error("group `{0}` nests deeper than group > subgroup > subcommand")]
    GroupTooDeep(String),

    #[error("owner_id and owner_ids are mutually exclusive")]
    ConflictingOwnerIds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_error_carries_original() {
        let err = CommandError::Invoke {
            command: "ping".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn check_failure_classification() {
        assert!(CommandError::CheckFailure("x".into()).is_check_failure());
        assert!(CommandError::GlobalCheckFailure("x".into()).is_check_failure());
        assert!(!CommandError::UnknownSubcommand("x".into()).is_check_failure());
    }

    #[test]
    fn forbidden_detection() {
        assert!(HttpError::Forbidden("missing access".into()).is_forbidden());
        assert!(!HttpError::NotFound("gone".into()).is_forbidden());
    }
}
