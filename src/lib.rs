//! Application command registration and dispatch for Discord bots.
//!
//! This crate owns the command layer only: declaring commands, reconciling
//! them against the remote command store, and routing inbound interactions
//! through a check/hook/error pipeline. The gateway connection, REST
//! transport and guild cache are collaborator traits in [`client`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use cordial::{slash_command, Bot, CommandOption, Config, OptionType, Value};
//! # async fn example(http: Arc<dyn cordial::client::Http>, cache: Arc<dyn cordial::client::GuildCache>) -> anyhow::Result<()> {
//!
//! let bot = Bot::builder(Config::from_env()?, http, cache).build()?;
//!
//! bot.command(
//!     slash_command("ping")
//!         .description("Ping the bot")
//!         .option(CommandOption::new(OptionType::String, "msg", "Message to echo").required(true))
//!         .handler(|ctx| async move {
//!             let msg = ctx.option("msg").and_then(Value::as_str).unwrap_or("pong");
//!             tracing::info!("ping: {}", msg);
//!             Ok(())
//!         })?,
//! )
//! .await;
//!
//! bot.register_commands().await?;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod client;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interaction;
pub mod registry;
pub mod sync;

pub use bot::{Bot, BotBuilder};
pub use client::{Event, EventSink, LogEvents};
pub use commands::{
    has_any_role, has_role, is_owner, is_user, message_command, slash_command, slash_group,
    user_command, ApplicationCommand, CommandOption, CommandPermission, CommandType, Context,
    Invocation, OptionType,
};
pub use config::Config;
pub use error::{BuildError, Cancelled, CommandError, HttpError, SyncError};
pub use interaction::{Interaction, InteractionType, Value};
