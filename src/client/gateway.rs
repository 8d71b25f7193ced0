//! Gateway-side contracts: guild snapshots and notification fan-out.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::CommandError;
use crate::interaction::Interaction;

/// A role as seen by the guild cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

/// Snapshot of a guild taken from the gateway cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: u64,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Guild {
    /// Look up a role by name. First match wins.
    pub fn role_named(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.name == name)
    }
}

/// Guild membership as known to the gateway cache collaborator.
pub trait GuildCache: Send + Sync {
    /// Snapshot of every guild the bot is currently in.
    fn guilds(&self) -> Vec<Guild>;
}

/// Notifications the dispatcher fans out to application-level listeners.
#[derive(Debug, Clone)]
pub enum Event {
    /// An interaction referenced a command id with no registry entry.
    UnknownCommand { interaction: Arc<Interaction> },
    /// A command was resolved and is about to be invoked.
    CommandInvoked {
        command: String,
        interaction: Arc<Interaction>,
    },
    /// The invocation finished without error.
    CommandCompleted { command: String },
    /// The invocation failed. Fired exactly once per failed invocation,
    /// after any command-local and cog-level error hooks ran.
    CommandError {
        command: String,
        error: Arc<CommandError>,
    },
}

/// Fan-out sink for dispatcher notifications.
pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: Event);
}

/// Default sink: logs events instead of crashing the dispatch loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvents;

impl EventSink for LogEvents {
    fn dispatch(&self, event: Event) {
        match event {
            Event::UnknownCommand { interaction } => {
                warn!("Received unknown application command: {}", interaction.id);
            }
            Event::CommandInvoked { command, .. } => {
                debug!("Invoking application command: {}", command);
            }
            Event::CommandCompleted { command } => {
                debug!("Application command completed: {}", command);
            }
            Event::CommandError { command, error } => {
                error!("Ignoring exception in command {}: {:?}", command, error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_lookup_by_name() {
        let guild = Guild {
            id: 1,
            name: "test".to_string(),
            roles: vec![
                Role {
                    id: 10,
                    name: "mod".to_string(),
                },
                Role {
                    id: 11,
                    name: "admin".to_string(),
                },
            ],
        };
        assert_eq!(guild.role_named("admin").map(|r| r.id), Some(11));
        assert!(guild.role_named("missing").is_none());
    }
}
