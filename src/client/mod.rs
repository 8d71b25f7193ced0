//! Contracts consumed from the gateway and REST collaborators.

mod gateway;
mod rest;

pub use gateway::{Event, EventSink, Guild, GuildCache, LogEvents, Role};
pub use rest::{
    ApplicationInfo, CommandPayload, CommandPermissions, Http, PermissionData, PermissionKind,
};
