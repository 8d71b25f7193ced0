//! Invocation context handed to checks, hooks and callbacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::interaction::{Interaction, OptionValue, Value};

use super::command::ApplicationCommand;

/// Context bound to one command invocation.
///
/// Cheap to clone; all clones share the interaction, the bound command and
/// the failure flag.
#[derive(Debug, Clone)]
pub struct Context {
    interaction: Arc<Interaction>,
    command: String,
    args: Arc<Vec<OptionValue>>,
    bound: Arc<Mutex<Option<Arc<ApplicationCommand>>>>,
    failed: Arc<AtomicBool>,
}

impl Context {
    pub(crate) fn new(interaction: Arc<Interaction>, command: String) -> Self {
        let args = interaction
            .data
            .as_ref()
            .map(|data| data.options.clone())
            .unwrap_or_default();
        Self {
            interaction,
            command,
            args: Arc::new(args),
            bound: Arc::new(Mutex::new(None)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Derive a context for a subcommand, narrowing the visible options to
    /// the nested ones. The command binding and failure flag stay shared,
    /// so the dispatcher sees which command actually ran.
    pub(crate) fn for_subcommand(&self, name: &str, args: Vec<OptionValue>) -> Self {
        Self {
            interaction: Arc::clone(&self.interaction),
            command: format!("{} {}", self.command, name),
            args: Arc::new(args),
            bound: Arc::clone(&self.bound),
            failed: Arc::clone(&self.failed),
        }
    }

    /// The command currently attached to this invocation. Set during
    /// `prepare`; for groups this ends up being the routed subcommand.
    pub fn command(&self) -> Option<Arc<ApplicationCommand>> {
        self.bound.lock().unwrap().clone()
    }

    pub(crate) fn bind_command(&self, command: Arc<ApplicationCommand>) {
        *self.bound.lock().unwrap() = Some(command);
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Qualified name of the command being invoked, e.g. `project add`.
    pub fn command_name(&self) -> &str {
        &self.command
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.interaction.guild_id
    }

    pub fn channel_id(&self) -> Option<u64> {
        self.interaction.channel_id
    }

    pub fn user_id(&self) -> u64 {
        self.interaction.user_id
    }

    /// Target of a context-menu invocation, if any.
    pub fn target_id(&self) -> Option<u64> {
        self.interaction.data.as_ref().and_then(|data| data.target_id)
    }

    /// Option values supplied for the command (or subcommand) being invoked.
    pub fn options(&self) -> &[OptionValue] {
        &self.args
    }

    /// Look up a supplied option value by name.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .find(|opt| opt.name == name)
            .and_then(|opt| opt.value.as_ref())
    }

    /// The option the user is currently typing, for autocomplete.
    pub fn focused_option(&self) -> Option<&OptionValue> {
        self.args.iter().find(|opt| opt.focused)
    }

    /// Whether the invocation has been routed to error handling.
    pub fn command_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_failed(&self) {
        self.failed.store(true, Ordering::Relaxed);
    }
}
