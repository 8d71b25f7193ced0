//! Command descriptors and the invocation pipeline.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_repr::{Deserialize_repr, Serialize_repr};
use tracing::warn;

use crate::client::{CommandPayload, Event, EventSink};
use crate::error::{BuildError, Cancelled, CommandError};

use super::context::Context;
use super::options::{CommandOption, OptionType};
use super::permissions::CommandPermission;

/// Owned future alias used by the hook pipeline.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a callback or hook reports back. Non-framework errors are wrapped
/// into [`CommandError::Invoke`] at the invocation boundary.
pub type CommandResult = anyhow::Result<()>;

/// The wrapped user callback.
pub type Callback = Arc<dyn Fn(Context) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// Before/after lifecycle hook. Same shape as a callback.
pub type Hook = Callback;

/// Per-command guard, evaluated before invocation.
pub type Check = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Command-local error handler.
pub type ErrorHook = Arc<dyn Fn(Context, Arc<CommandError>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Autocomplete callback. Bypasses checks and hooks entirely.
pub type AutocompleteHook = Arc<dyn Fn(Context) -> BoxFuture<'static, ()> + Send + Sync>;

fn wrap_callback<F, Fut>(f: F) -> Callback
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Command type discriminant as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandType {
    Slash = 1,
    User = 2,
    Message = 3,
}

/// Outcome of one invocation.
///
/// Cancellation is an explicit variant rather than an error: a cancelled
/// invocation is treated as a no-op completion and never logged as a
/// failure.
#[derive(Debug)]
pub enum Invocation {
    Completed,
    Failed(CommandError),
    Cancelled,
}

/// Hook-lookup contract consumed from command groups ("cogs").
///
/// Only the error hook is consumed here; everything else a cog does is out
/// of scope.
pub trait Cog: Send + Sync {
    /// Cog-level error hook. Default implementation does nothing.
    fn command_error<'a>(&'a self, ctx: Context, error: Arc<CommandError>) -> BoxFuture<'a, ()> {
        let _ = (ctx, error);
        Box::pin(async {})
    }
}

/// A single invocable unit: slash command, context-menu command, or
/// subcommand group. Immutable after construction apart from the remote id
/// assigned during sync.
pub struct ApplicationCommand {
    name: String,
    description: String,
    kind: CommandType,
    guild_ids: Option<Vec<u64>>,
    options: Vec<CommandOption>,
    default_permission: bool,
    permissions: Vec<CommandPermission>,
    checks: Vec<Check>,
    before: Option<Hook>,
    after: Option<Hook>,
    error_hook: Option<ErrorHook>,
    autocomplete: Option<AutocompleteHook>,
    cog: Option<Arc<dyn Cog>>,
    callback: Option<Callback>,
    subcommands: Vec<Arc<ApplicationCommand>>,
    is_subcommand: bool,
    /// 0 means unassigned; snowflakes are never 0
    remote_id: AtomicU64,
}

impl fmt::Debug for ApplicationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationCommand")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("guild_ids", &self.guild_ids)
            .field("remote_id", &self.remote_id())
            .finish_non_exhaustive()
    }
}

impl ApplicationCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn guild_ids(&self) -> Option<&[u64]> {
        self.guild_ids.as_deref()
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn permissions(&self) -> &[CommandPermission] {
        &self.permissions
    }

    pub fn default_permission(&self) -> bool {
        self.default_permission
    }

    pub fn is_subcommand(&self) -> bool {
        self.is_subcommand
    }

    pub fn subcommands(&self) -> &[Arc<ApplicationCommand>] {
        &self.subcommands
    }

    /// True when the command has no guild scope.
    pub fn is_global(&self) -> bool {
        self.guild_ids.is_none()
    }

    /// True when the command's scope covers `guild_id`.
    pub fn is_scoped_to(&self, guild_id: u64) -> bool {
        self.guild_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(&guild_id))
    }

    /// Remote id assigned by the last successful sync, if any.
    pub fn remote_id(&self) -> Option<u64> {
        match self.remote_id.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_remote_id(&self, id: u64) {
        self.remote_id.store(id, Ordering::Release);
    }

    pub(crate) fn force_guild_ids(&mut self, ids: Vec<u64>) {
        self.guild_ids = Some(ids);
    }

    pub(crate) fn mark_subcommand(&mut self) {
        self.is_subcommand = true;
    }

    /// Reconciliation key match against a remote record: name and type.
    pub fn matches(&self, payload: &CommandPayload) -> bool {
        self.name == payload.name && self.kind == payload.kind
    }

    /// Wire form for a bulk upsert. `existing_id` carries a matched remote
    /// id forward so the upsert updates instead of duplicating.
    pub fn payload(&self, existing_id: Option<u64>) -> CommandPayload {
        let options = if self.subcommands.is_empty() {
            self.options.clone()
        } else {
            self.subcommands.iter().map(|sub| sub.as_option()).collect()
        };
        CommandPayload {
            id: existing_id,
            kind: self.kind,
            name: self.name.clone(),
            description: self.description.clone(),
            options,
            default_permission: self.default_permission,
            guild_id: None,
        }
    }

    /// Wire form of a subcommand nested inside its parent's payload.
    fn as_option(&self) -> CommandOption {
        let (kind, options) = if self.subcommands.is_empty() {
            (OptionType::SubCommand, self.options.clone())
        } else {
            (
                OptionType::SubCommandGroup,
                self.subcommands.iter().map(|sub| sub.as_option()).collect(),
            )
        };
        CommandOption {
            kind,
            name: self.name.clone(),
            description: self.description.clone(),
            required: false,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            channel_types: Vec::new(),
            options,
        }
    }

    /// A fresh command built from the original constructor arguments:
    /// checks, hooks and the error handler are re-attached, the remote id
    /// starts unassigned. Used to bind one handler under several
    /// registration scopes.
    pub fn copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            guild_ids: self.guild_ids.clone(),
            options: self.options.clone(),
            default_permission: self.default_permission,
            permissions: self.permissions.clone(),
            checks: self.checks.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            error_hook: self.error_hook.clone(),
            autocomplete: self.autocomplete.clone(),
            cog: self.cog.clone(),
            callback: self.callback.clone(),
            subcommands: self
                .subcommands
                .iter()
                .map(|sub| Arc::new(sub.copy()))
                .collect(),
            is_subcommand: self.is_subcommand,
            remote_id: AtomicU64::new(0),
        }
    }

    /// Evaluate the command-level checks, short-circuiting on the first
    /// rejection.
    pub fn can_run(&self, ctx: &Context) -> Result<(), CommandError> {
        for check in &self.checks {
            if !check(ctx) {
                return Err(CommandError::CheckFailure(self.name.clone()));
            }
        }
        Ok(())
    }

    /// Run the check pipeline, then the before-hook. The command is already
    /// attached to the context by the caller.
    async fn prepare(&self, ctx: &Context) -> Result<(), Invocation> {
        if let Err(err) = self.can_run(ctx) {
            return Err(Invocation::Failed(err));
        }

        if let Some(before) = &self.before {
            match classify(before(ctx.clone()).await, ctx.command_name()) {
                Invocation::Completed => {}
                other => return Err(other),
            }
        }
        Ok(())
    }

    /// Run the full pipeline: attach to the context, prepare (checks and
    /// before-hook), then the callback (or subcommand routing), then the
    /// after-hook. The after-hook runs even when the callback fails; it is
    /// skipped when prepare fails.
    pub async fn invoke(self: Arc<Self>, ctx: Context) -> Invocation {
        self.invoke_recursive(ctx).await
    }

    fn invoke_recursive(self: Arc<Self>, ctx: Context) -> BoxFuture<'static, Invocation> {
        Box::pin(async move {
            ctx.bind_command(Arc::clone(&self));

            if let Err(outcome) = self.prepare(&ctx).await {
                return outcome;
            }

            let mut outcome = if self.subcommands.is_empty() {
                match &self.callback {
                    Some(callback) => classify(callback(ctx.clone()).await, ctx.command_name()),
                    // unreachable for built commands; builders reject
                    // callback-less leaves
                    None => Invocation::Failed(CommandError::UnknownSubcommand(
                        ctx.command_name().to_string(),
                    )),
                }
            } else {
                self.invoke_subcommand(&ctx).await
            };

            if let Some(after) = &self.after {
                if let Err(err) = after(ctx.clone()).await {
                    if matches!(outcome, Invocation::Completed) {
                        outcome = classify(Err(err), ctx.command_name());
                    } else {
                        warn!(
                            "After-hook for command {} failed: {:#}",
                            ctx.command_name(),
                            err
                        );
                    }
                }
            }
            outcome
        })
    }

    async fn invoke_subcommand(&self, ctx: &Context) -> Invocation {
        let Some(entry) = ctx.options().first() else {
            return Invocation::Failed(CommandError::UnknownSubcommand(
                ctx.command_name().to_string(),
            ));
        };
        let Some(sub) = self.subcommands.iter().find(|sub| sub.name == entry.name) else {
            return Invocation::Failed(CommandError::UnknownSubcommand(
                ctx.command_name().to_string(),
            ));
        };
        let child = ctx.for_subcommand(&entry.name, entry.options.clone());
        Arc::clone(sub).invoke_recursive(child).await
    }

    /// Delegate an autocomplete interaction to the command's autocomplete
    /// hook, routing through groups. No checks or hooks run.
    pub async fn invoke_autocomplete(self: Arc<Self>, ctx: Context) {
        self.autocomplete_recursive(ctx).await
    }

    fn autocomplete_recursive(self: Arc<Self>, ctx: Context) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if !self.subcommands.is_empty() {
                let Some(entry) = ctx.options().first() else {
                    return;
                };
                if let Some(sub) = self.subcommands.iter().find(|sub| sub.name == entry.name) {
                    let child = ctx.for_subcommand(&entry.name, entry.options.clone());
                    Arc::clone(sub).autocomplete_recursive(child).await;
                }
                return;
            }
            if let Some(autocomplete) = &self.autocomplete {
                autocomplete(ctx).await;
            }
        })
    }

    /// Route a failed invocation through the error hooks: the command-local
    /// hook first, then the cog-level hook, and finally — always — exactly
    /// one global `CommandError` notification.
    pub async fn dispatch_error(&self, ctx: &Context, error: CommandError, events: &dyn EventSink) {
        ctx.mark_failed();
        let error = Arc::new(error);

        if let Some(hook) = &self.error_hook {
            hook(ctx.clone(), Arc::clone(&error)).await;
        }

        if let Some(cog) = &self.cog {
            cog.command_error(ctx.clone(), Arc::clone(&error)).await;
        }

        events.dispatch(Event::CommandError {
            command: ctx.command_name().to_string(),
            error,
        });
    }
}

/// Translate a callback result into an invocation outcome: framework errors
/// pass through, the cancellation marker is swallowed, anything else is
/// wrapped with the original preserved.
fn classify(result: CommandResult, command: &str) -> Invocation {
    match result {
        Ok(()) => Invocation::Completed,
        Err(err) => match err.downcast::<Cancelled>() {
            Ok(_) => Invocation::Cancelled,
            Err(err) => match err.downcast::<CommandError>() {
                Ok(framework) => Invocation::Failed(framework),
                Err(err) => Invocation::Failed(CommandError::Invoke {
                    command: command.to_string(),
                    source: err,
                }),
            },
        },
    }
}

/// Builder for a slash command.
pub fn slash_command(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::new(CommandType::Slash, name)
}

/// Builder for a user context-menu command.
pub fn user_command(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::new(CommandType::User, name)
}

/// Builder for a message context-menu command.
pub fn message_command(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::new(CommandType::Message, name)
}

/// Builder for a slash command group.
pub fn slash_group(name: impl Into<String>, description: impl Into<String>) -> GroupBuilder {
    GroupBuilder::new(name, description)
}

/// Declarative command configuration. The terminal [`handler`] call
/// validates and constructs the command.
///
/// [`handler`]: CommandBuilder::handler
pub struct CommandBuilder {
    kind: CommandType,
    name: String,
    description: String,
    guild_ids: Option<Vec<u64>>,
    options: Vec<CommandOption>,
    default_permission: Option<bool>,
    permissions: Vec<CommandPermission>,
    checks: Vec<Check>,
    before: Option<Hook>,
    after: Option<Hook>,
    error_hook: Option<ErrorHook>,
    autocomplete: Option<AutocompleteHook>,
    cog: Option<Arc<dyn Cog>>,
}

impl CommandBuilder {
    fn new(kind: CommandType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            guild_ids: None,
            options: Vec::new(),
            default_permission: None,
            permissions: Vec::new(),
            checks: Vec::new(),
            before: None,
            after: None,
            error_hook: None,
            autocomplete: None,
            cog: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict the command to the given guilds. Omit for a global command.
    pub fn guild_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.guild_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }

    /// Explicit default visibility. Forced to `false` whenever permission
    /// overwrites are declared.
    pub fn default_permission(mut self, allow: bool) -> Self {
        self.default_permission = Some(allow);
        self
    }

    pub fn permission(mut self, permission: CommandPermission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn permissions(mut self, permissions: impl IntoIterator<Item = CommandPermission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    pub fn before<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.before = Some(wrap_callback(hook));
        self
    }

    pub fn after<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.after = Some(wrap_callback(hook));
        self
    }

    pub fn on_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Context, Arc<CommandError>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.error_hook = Some(Arc::new(move |ctx, err| Box::pin(hook(ctx, err))));
        self
    }

    pub fn autocomplete<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.autocomplete = Some(Arc::new(move |ctx| Box::pin(hook(ctx))));
        self
    }

    pub fn cog(mut self, cog: Arc<dyn Cog>) -> Self {
        self.cog = Some(cog);
        self
    }

    /// Validate the declaration and attach the callback. The leading
    /// context parameter is enforced by the callback signature.
    pub fn handler<F, Fut>(self, callback: F) -> Result<ApplicationCommand, BuildError>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        validate_name(self.kind, &self.name)?;
        validate_description(self.kind, &self.name, &self.description)?;
        validate_scope(&self.name, self.guild_ids.as_deref())?;
        validate_options(&self.name, self.kind, &self.options)?;

        let default_permission = if self.permissions.is_empty() {
            self.default_permission.unwrap_or(true)
        } else {
            false
        };

        Ok(ApplicationCommand {
            name: self.name,
            description: self.description,
            kind: self.kind,
            guild_ids: self.guild_ids,
            options: self.options,
            default_permission,
            permissions: self.permissions,
            checks: self.checks,
            before: self.before,
            after: self.after,
            error_hook: self.error_hook,
            autocomplete: self.autocomplete,
            cog: self.cog,
            callback: Some(wrap_callback(callback)),
            subcommands: Vec::new(),
            is_subcommand: false,
            remote_id: AtomicU64::new(0),
        })
    }
}

/// Declarative configuration for a command group. Subcommands are built as
/// ordinary slash commands and attached with [`subcommand`].
///
/// [`subcommand`]: GroupBuilder::subcommand
pub struct GroupBuilder {
    name: String,
    description: String,
    guild_ids: Option<Vec<u64>>,
    checks: Vec<Check>,
    permissions: Vec<CommandPermission>,
    default_permission: Option<bool>,
    cog: Option<Arc<dyn Cog>>,
    subcommands: Vec<ApplicationCommand>,
}

impl GroupBuilder {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            guild_ids: None,
            checks: Vec::new(),
            permissions: Vec::new(),
            default_permission: None,
            cog: None,
            subcommands: Vec::new(),
        }
    }

    pub fn guild_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.guild_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn permission(mut self, permission: CommandPermission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn default_permission(mut self, allow: bool) -> Self {
        self.default_permission = Some(allow);
        self
    }

    pub fn cog(mut self, cog: Arc<dyn Cog>) -> Self {
        self.cog = Some(cog);
        self
    }

    /// Attach a subcommand or a nested group (built with [`slash_group`]).
    pub fn subcommand(mut self, mut command: ApplicationCommand) -> Self {
        command.mark_subcommand();
        self.subcommands.push(command);
        self
    }

    pub fn build(self) -> Result<ApplicationCommand, BuildError> {
        validate_name(CommandType::Slash, &self.name)?;
        validate_description(CommandType::Slash, &self.name, &self.description)?;
        validate_scope(&self.name, self.guild_ids.as_deref())?;

        if self.subcommands.is_empty() {
            return Err(BuildError::EmptyGroup(self.name));
        }
        for sub in &self.subcommands {
            for nested in sub.subcommands() {
                if !nested.subcommands().is_empty() {
                    return Err(BuildError::GroupTooDeep(self.name));
                }
            }
        }

        let default_permission = if self.permissions.is_empty() {
            self.default_permission.unwrap_or(true)
        } else {
            false
        };

        Ok(ApplicationCommand {
            name: self.name,
            description: self.description,
            kind: CommandType::Slash,
            guild_ids: self.guild_ids,
            options: Vec::new(),
            default_permission,
            permissions: self.permissions,
            checks: self.checks,
            before: None,
            after: None,
            error_hook: None,
            autocomplete: None,
            cog: self.cog,
            callback: None,
            subcommands: self.subcommands.into_iter().map(Arc::new).collect(),
            is_subcommand: false,
            remote_id: AtomicU64::new(0),
        })
    }
}

fn validate_name(kind: CommandType, name: &str) -> Result<(), BuildError> {
    if name.is_empty() || name.chars().count() > 32 {
        return Err(BuildError::InvalidName(name.to_string()));
    }
    if kind == CommandType::Slash {
        let valid = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(BuildError::InvalidName(name.to_string()));
        }
    }
    Ok(())
}

fn validate_description(kind: CommandType, name: &str, description: &str) -> Result<(), BuildError> {
    match kind {
        CommandType::Slash => {
            if description.is_empty() || description.chars().count() > 100 {
                return Err(BuildError::InvalidDescription(name.to_string()));
            }
        }
        CommandType::User | CommandType::Message => {
            if !description.is_empty() {
                return Err(BuildError::InvalidContextMenu(name.to_string()));
            }
        }
    }
    Ok(())
}

fn validate_scope(name: &str, guild_ids: Option<&[u64]>) -> Result<(), BuildError> {
    if guild_ids.is_some_and(<[u64]>::is_empty) {
        return Err(BuildError::EmptyGuildScope(name.to_string()));
    }
    Ok(())
}

fn validate_options(
    name: &str,
    kind: CommandType,
    options: &[CommandOption],
) -> Result<(), BuildError> {
    if kind != CommandType::Slash {
        if options.is_empty() {
            return Ok(());
        }
        return Err(BuildError::InvalidContextMenu(name.to_string()));
    }
    if options.len() > 25 {
        return Err(BuildError::TooManyOptions(name.to_string()));
    }
    let mut seen_optional = false;
    for option in options {
        if option.required && seen_optional {
            return Err(BuildError::RequiredOptionAfterOptional {
                command: name.to_string(),
                option: option.name.clone(),
            });
        }
        seen_optional |= !option.required;

        if option.choices.len() > 25 {
            return Err(BuildError::TooManyChoices {
                command: name.to_string(),
                option: option.name.clone(),
            });
        }
        if (option.min_value.is_some() || option.max_value.is_some()) && !option.kind.is_numeric() {
            return Err(BuildError::InvalidRange {
                command: name.to_string(),
                option: option.name.clone(),
            });
        }
        if !option.channel_types.is_empty() && option.kind != OptionType::Channel {
            return Err(BuildError::InvalidChannelFilter {
                command: name.to_string(),
                option: option.name.clone(),
            });
        }
        validate_options(name, kind, &option.options)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Interaction, InteractionData, InteractionType, OptionValue, Value};
    use std::sync::Mutex;

    fn test_context(command: &str, options: Vec<OptionValue>) -> Context {
        let interaction = Arc::new(Interaction {
            id: 1,
            application_id: 2,
            kind: InteractionType::ApplicationCommand,
            data: Some(InteractionData {
                id: 42,
                name: command.to_string(),
                options,
                target_id: None,
            }),
            guild_id: Some(100),
            channel_id: Some(200),
            user_id: 300,
            token: "tok".to_string(),
        });
        Context::new(interaction, command.to_string())
    }

    fn ping() -> CommandBuilder {
        slash_command("ping").description("Ping the bot")
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "Has Space", "UPPER", "x".repeat(33).as_str()] {
            let result = slash_command(name)
                .description("d")
                .handler(|_ctx| async { Ok(()) });
            assert!(
                matches!(result, Err(BuildError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_descriptions() {
        let result = slash_command("ping").handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::InvalidDescription(_))));

        let result = slash_command("ping")
            .description("d".repeat(101))
            .handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::InvalidDescription(_))));
    }

    #[test]
    fn context_menu_rejects_options_and_description() {
        let result = user_command("Inspect")
            .description("not allowed")
            .handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::InvalidContextMenu(_))));

        let result = user_command("Inspect")
            .option(CommandOption::new(OptionType::String, "x", "y"))
            .handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::InvalidContextMenu(_))));

        assert!(user_command("Inspect User")
            .handler(|_ctx| async { Ok(()) })
            .is_ok());
    }

    #[test]
    fn rejects_empty_guild_scope() {
        let result = ping().guild_ids([]).handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::EmptyGuildScope(_))));
    }

    #[test]
    fn rejects_required_after_optional() {
        let result = ping()
            .option(CommandOption::new(OptionType::String, "a", "first"))
            .option(CommandOption::new(OptionType::String, "b", "second").required(true))
            .handler(|_ctx| async { Ok(()) });
        assert!(matches!(
            result,
            Err(BuildError::RequiredOptionAfterOptional { .. })
        ));
    }

    #[test]
    fn rejects_range_on_non_numeric_option() {
        let result = ping()
            .option(CommandOption::new(OptionType::String, "a", "d").min_value(1.0))
            .handler(|_ctx| async { Ok(()) });
        assert!(matches!(result, Err(BuildError::InvalidRange { .. })));
    }

    #[test]
    fn permissions_force_restricted_default() {
        let cmd = ping()
            .default_permission(true)
            .permission(CommandPermission::user(5))
            .handler(|_ctx| async { Ok(()) })
            .unwrap();
        assert!(!cmd.default_permission());

        let open = ping().handler(|_ctx| async { Ok(()) }).unwrap();
        assert!(open.default_permission());
    }

    #[test]
    fn group_requires_subcommands_and_bounded_depth() {
        assert!(matches!(
            slash_group("config", "Configure").build(),
            Err(BuildError::EmptyGroup(_))
        ));

        let leaf = || {
            slash_command("value")
                .description("Leaf")
                .handler(|_ctx| async { Ok(()) })
                .unwrap()
        };
        let subgroup = slash_group("inner", "Inner").subcommand(leaf()).build().unwrap();
        let deep = slash_group("outer", "Outer").subcommand(subgroup).build().unwrap();
        assert!(matches!(
            slash_group("root", "Root").subcommand(deep).build(),
            Err(BuildError::GroupTooDeep(_))
        ));
    }

    #[test]
    fn copy_resets_remote_id_and_keeps_hooks() {
        let cmd = ping()
            .check(|_ctx| true)
            .permission(CommandPermission::owner())
            .handler(|_ctx| async { Ok(()) })
            .unwrap();
        cmd.set_remote_id(42);

        let copy = cmd.copy();
        assert_eq!(copy.remote_id(), None);
        assert_eq!(cmd.remote_id(), Some(42));
        assert_eq!(copy.checks.len(), 1);
        assert_eq!(copy.permissions().len(), 1);
    }

    #[test]
    fn group_payload_nests_subcommands() {
        let add = slash_command("add")
            .description("Add a project")
            .option(CommandOption::new(OptionType::String, "name", "Project name").required(true))
            .handler(|_ctx| async { Ok(()) })
            .unwrap();
        let group = slash_group("project", "Manage projects")
            .subcommand(add)
            .build()
            .unwrap();

        let payload = group.payload(None);
        assert_eq!(payload.options.len(), 1);
        assert_eq!(payload.options[0].kind, OptionType::SubCommand);
        assert_eq!(payload.options[0].name, "add");
        assert_eq!(payload.options[0].options.len(), 1);
    }

    #[tokio::test]
    async fn callback_error_is_wrapped_with_original() {
        let cmd = Arc::new(
            ping()
                .handler(|_ctx| async { Err(anyhow::anyhow!("boom")) })
                .unwrap(),
        );
        match cmd.invoke(test_context("ping", Vec::new())).await {
            Invocation::Failed(CommandError::Invoke { command, source }) => {
                assert_eq!(command, "ping");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected Invoke failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_marker_is_swallowed() {
        let cmd = Arc::new(
            ping()
                .handler(|_ctx| async { Err(anyhow::Error::new(Cancelled)) })
                .unwrap(),
        );
        assert!(matches!(
            cmd.invoke(test_context("ping", Vec::new())).await,
            Invocation::Cancelled
        ));
    }

    #[tokio::test]
    async fn check_failure_skips_callback_and_after_hook() {
        let ran: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let cb_ran = Arc::clone(&ran);
        let after_ran = Arc::clone(&ran);
        let cmd = Arc::new(
            ping()
                .check(|_ctx| false)
                .after(move |_ctx| {
                    after_ran.lock().unwrap().push("after");
                    async { Ok(()) }
                })
                .handler(move |_ctx| {
                    cb_ran.lock().unwrap().push("callback");
                    async { Ok(()) }
                })
                .unwrap(),
        );
        match cmd.invoke(test_context("ping", Vec::new())).await {
            Invocation::Failed(err) => assert!(err.is_check_failure()),
            other => panic!("expected check failure, got {other:?}"),
        }
        assert!(ran.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hook_order_is_before_callback_after_despite_error() {
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let before = Arc::clone(&order);
        let during = Arc::clone(&order);
        let after = Arc::clone(&order);
        let cmd = Arc::new(
            ping()
                .before(move |_ctx| {
                    before.lock().unwrap().push("before");
                    async { Ok(()) }
                })
                .after(move |_ctx| {
                    after.lock().unwrap().push("after");
                    async { Ok(()) }
                })
                .handler(move |_ctx| {
                    during.lock().unwrap().push("callback");
                    async { Err(anyhow::anyhow!("boom")) }
                })
                .unwrap(),
        );
        let outcome = cmd.invoke(test_context("ping", Vec::new())).await;
        assert!(matches!(outcome, Invocation::Failed(_)));
        assert_eq!(*order.lock().unwrap(), vec!["before", "callback", "after"]);
    }

    #[tokio::test]
    async fn group_routes_to_subcommand_by_first_option() {
        let hit: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let hit_clone = Arc::clone(&hit);
        let add = slash_command("add")
            .description("Add")
            .option(CommandOption::new(OptionType::String, "name", "Name").required(true))
            .handler(move |ctx| {
                *hit_clone.lock().unwrap() =
                    ctx.option("name").and_then(Value::as_str).map(String::from);
                async { Ok(()) }
            })
            .unwrap();
        let group = Arc::new(
            slash_group("project", "Manage projects")
                .subcommand(add)
                .build()
                .unwrap(),
        );

        let ctx = test_context(
            "project",
            vec![OptionValue::subcommand(
                "add",
                vec![OptionValue::new("name", Value::String("api".to_string()))],
            )],
        );
        assert!(matches!(group.invoke(ctx).await, Invocation::Completed));
        assert_eq!(hit.lock().unwrap().as_deref(), Some("api"));
    }

    #[tokio::test]
    async fn group_with_unknown_subcommand_fails() {
        let add = slash_command("add")
            .description("Add")
            .handler(|_ctx| async { Ok(()) })
            .unwrap();
        let group = Arc::new(
            slash_group("project", "Manage projects")
                .subcommand(add)
                .build()
                .unwrap(),
        );
        let ctx = test_context(
            "project",
            vec![OptionValue::subcommand("remove", Vec::new())],
        );
        assert!(matches!(
            group.invoke(ctx).await,
            Invocation::Failed(CommandError::UnknownSubcommand(_))
        ));
    }
}
