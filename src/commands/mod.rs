//! The application command layer: model, options, permissions, context.

mod command;
mod context;
mod options;
mod permissions;

pub use command::{
    message_command, slash_command, slash_group, user_command, ApplicationCommand, AutocompleteHook,
    BoxFuture, Callback, Check, Cog, CommandBuilder, CommandResult, CommandType, ErrorHook,
    GroupBuilder, Hook, Invocation,
};
pub use context::Context;
pub use options::{ChannelType, CommandOption, OptionChoice, OptionType};
pub use permissions::{
    has_any_role, has_role, is_owner, is_user, CommandPermission, PermissionResolver,
    PermissionTarget, MAX_OVERWRITES,
};
