//! Registry mediating between declared commands and their remote identities.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::commands::{ApplicationCommand, CommandType};

/// Owns the mapping from declared commands to remote ids.
///
/// `pending` holds every declaration and is reconciled on each sync run;
/// `by_remote_id` is authoritative once the synchronizer has written ids
/// back, and is the only map the dispatcher reads.
#[derive(Default)]
pub struct CommandRegistry {
    pending: Vec<Arc<ApplicationCommand>>,
    by_remote_id: HashMap<u64, Arc<ApplicationCommand>>,
    debug_guilds: Option<Vec<u64>>,
}

impl CommandRegistry {
    pub fn new(debug_guilds: Option<Vec<u64>>) -> Self {
        Self {
            pending: Vec::new(),
            by_remote_id: HashMap::new(),
            debug_guilds,
        }
    }

    /// Declare a command. Commands without an explicit guild scope are
    /// forced into the configured debug guilds, so development builds never
    /// publish globally by accident.
    pub fn add(&mut self, mut command: ApplicationCommand) -> Arc<ApplicationCommand> {
        if let Some(debug_guilds) = &self.debug_guilds {
            if command.is_global() {
                debug!(
                    "Forcing command {} into debug guild scope {:?}",
                    command.name(),
                    debug_guilds
                );
                command.force_guild_ids(debug_guilds.clone());
            }
        }
        let command = Arc::new(command);
        self.pending.push(Arc::clone(&command));
        command
    }

    /// Remove a synced command. The remote side is not touched.
    pub fn remove(&mut self, remote_id: u64) -> Option<Arc<ApplicationCommand>> {
        self.by_remote_id.remove(&remote_id)
    }

    /// Linear scan over synced commands by name and type. A supplied scope
    /// must match the stored scope exactly.
    pub fn get(
        &self,
        name: &str,
        guild_ids: Option<&[u64]>,
        kind: CommandType,
    ) -> Option<&Arc<ApplicationCommand>> {
        self.by_remote_id.values().find(|command| {
            command.name() == name
                && command.kind() == kind
                && (guild_ids.is_none() || command.guild_ids() == guild_ids)
        })
    }

    pub fn get_by_remote_id(&self, remote_id: u64) -> Option<&Arc<ApplicationCommand>> {
        self.by_remote_id.get(&remote_id)
    }

    /// Declared commands awaiting the next sync run.
    pub fn pending(&self) -> &[Arc<ApplicationCommand>] {
        &self.pending
    }

    /// Synced commands, in no particular order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<ApplicationCommand>> {
        self.by_remote_id.values()
    }

    /// Write a remote id back onto a command and index it. Drops any stale
    /// mapping when a resync assigned a different id.
    pub(crate) fn record_synced(&mut self, command: &Arc<ApplicationCommand>, remote_id: u64) {
        if let Some(old_id) = command.remote_id() {
            if old_id != remote_id {
                self.by_remote_id.remove(&old_id);
            }
        }
        command.set_remote_id(remote_id);
        self.by_remote_id
            .insert(remote_id, Arc::clone(command));
    }
}
