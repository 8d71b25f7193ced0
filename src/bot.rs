//! Composition root tying the registry, synchronizer and dispatcher
//! together.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::{EventSink, GuildCache, Http, LogEvents};
use crate::commands::{ApplicationCommand, Check, CommandType, Context};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{BuildError, SyncError};
use crate::interaction::Interaction;
use crate::registry::CommandRegistry;
use crate::sync::Synchronizer;

/// The application-command layer of a bot.
///
/// Owns the registry and delegates to a [`Synchronizer`] and a
/// [`Dispatcher`]. Wire it to a gateway client by calling
/// [`register_commands`] once per connection and
/// [`process_application_commands`] for every inbound interaction.
///
/// [`register_commands`]: Bot::register_commands
/// [`process_application_commands`]: Bot::process_application_commands
pub struct Bot {
    registry: Arc<RwLock<CommandRegistry>>,
    synchronizer: Synchronizer,
    dispatcher: Dispatcher,
}

impl Bot {
    pub fn builder(config: Config, http: Arc<dyn Http>, cache: Arc<dyn GuildCache>) -> BotBuilder {
        BotBuilder {
            config,
            http,
            cache,
            events: Arc::new(LogEvents),
            checks: Vec::new(),
        }
    }

    /// Declare a command. It is registered remotely on the next
    /// [`register_commands`] run.
    ///
    /// [`register_commands`]: Bot::register_commands
    pub async fn command(&self, command: ApplicationCommand) -> Arc<ApplicationCommand> {
        self.registry.write().await.add(command)
    }

    /// Remove a synced command from dispatch. The remote registration is
    /// left alone.
    pub async fn remove_command(&self, remote_id: u64) -> Option<Arc<ApplicationCommand>> {
        self.registry.write().await.remove(remote_id)
    }

    /// Look up a synced command by name and type, optionally requiring an
    /// exact guild scope.
    pub async fn get_command(
        &self,
        name: &str,
        guild_ids: Option<&[u64]>,
        kind: CommandType,
    ) -> Option<Arc<ApplicationCommand>> {
        self.registry.read().await.get(name, guild_ids, kind).cloned()
    }

    /// Reconcile declared commands with the remote store. Invoke once per
    /// gateway connection; re-running is idempotent.
    pub async fn register_commands(&self) -> Result<(), SyncError> {
        self.synchronizer.sync().await
    }

    /// Route one inbound interaction. Errors are contained; this never
    /// panics the dispatch loop.
    pub async fn process_application_commands(&self, interaction: Interaction) {
        self.dispatcher.dispatch(interaction).await;
    }
}

/// Builder for [`Bot`]. Collaborator handles are required up front; checks
/// and the event sink are optional.
pub struct BotBuilder {
    config: Config,
    http: Arc<dyn Http>,
    cache: Arc<dyn GuildCache>,
    events: Arc<dyn EventSink>,
    checks: Vec<Check>,
}

impl BotBuilder {
    /// Replace the default logging event sink.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Add a global once-check evaluated before every invocation.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn build(self) -> Result<Bot, BuildError> {
        self.config.validate()?;

        let registry = Arc::new(RwLock::new(CommandRegistry::new(
            self.config.debug_guilds.clone(),
        )));
        let synchronizer = Synchronizer::new(
            self.http,
            self.cache,
            Arc::clone(&registry),
            self.config.application_id,
            self.config.owner_override(),
        );
        let dispatcher = Dispatcher::new(Arc::clone(&registry), self.events, self.checks);

        Ok(Bot {
            registry,
            synchronizer,
            dispatcher,
        })
    }
}
