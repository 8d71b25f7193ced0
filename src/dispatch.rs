//! Routes inbound interactions to registered commands.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::client::{Event, EventSink};
use crate::commands::{Check, Context, Invocation};
use crate::error::CommandError;
use crate::interaction::{Interaction, InteractionType};
use crate::registry::CommandRegistry;

/// Per-interaction state machine: resolve, authorize, invoke, route errors.
///
/// Dispatch never lets an error escape: every failure ends in exactly one
/// `CommandError` notification, and the dispatch loop keeps running.
pub struct Dispatcher {
    registry: Arc<RwLock<CommandRegistry>>,
    events: Arc<dyn EventSink>,
    checks: Vec<Check>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<RwLock<CommandRegistry>>,
        events: Arc<dyn EventSink>,
        checks: Vec<Check>,
    ) -> Self {
        Self {
            registry,
            events,
            checks,
        }
    }

    pub async fn dispatch(&self, interaction: Interaction) {
        match interaction.kind {
            InteractionType::ApplicationCommand | InteractionType::Autocomplete => {}
            _ => return,
        }
        let interaction = Arc::new(interaction);

        let command = match &interaction.data {
            Some(data) => self
                .registry
                .read()
                .await
                .get_by_remote_id(data.id)
                .cloned(),
            None => None,
        };
        let Some(command) = command else {
            self.events.dispatch(Event::UnknownCommand {
                interaction: Arc::clone(&interaction),
            });
            return;
        };

        let ctx = Context::new(Arc::clone(&interaction), command.name().to_string());

        if interaction.kind == InteractionType::Autocomplete {
            Arc::clone(&command).invoke_autocomplete(ctx).await;
            return;
        }

        self.events.dispatch(Event::CommandInvoked {
            command: command.name().to_string(),
            interaction: Arc::clone(&interaction),
        });

        let outcome = match self.can_run_once(&ctx, command.name()) {
            Err(err) => Invocation::Failed(err),
            Ok(()) => Arc::clone(&command).invoke(ctx.clone()).await,
        };

        match outcome {
            Invocation::Completed => {
                self.events.dispatch(Event::CommandCompleted {
                    command: ctx.command_name().to_string(),
                });
            }
            Invocation::Cancelled => {
                // deliberate: cancellation reflects shutdown or teardown,
                // never an error
                debug!("Invocation of {} cancelled", ctx.command_name());
            }
            Invocation::Failed(error) => {
                // route through the command that actually ran, so a routed
                // subcommand's own error hooks fire
                let handler = ctx.command().unwrap_or_else(|| Arc::clone(&command));
                handler.dispatch_error(&ctx, error, self.events.as_ref()).await;
            }
        }
    }

    /// Global once-checks owned by the bot, evaluated before the command's
    /// own pipeline. Short-circuits on the first rejection.
    fn can_run_once(&self, ctx: &Context, command: &str) -> Result<(), CommandError> {
        for check in &self.checks {
            if !check(ctx) {
                return Err(CommandError::GlobalCheckFailure(command.to_string()));
            }
        }
        Ok(())
    }
}
