//! Reconciles declared commands against the remote command store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::client::{CommandPayload, CommandPermissions, Guild, GuildCache, Http};
use crate::commands::{ApplicationCommand, PermissionResolver, PermissionTarget};
use crate::error::SyncError;
use crate::registry::CommandRegistry;

/// Performs the registration sync: one idempotent pass that upserts global
/// and per-guild commands and writes remote ids back into the registry.
pub struct Synchronizer {
    http: Arc<dyn Http>,
    cache: Arc<dyn GuildCache>,
    registry: Arc<RwLock<CommandRegistry>>,
    app_id: u64,
    owner_override: Option<Vec<u64>>,
}

impl Synchronizer {
    pub fn new(
        http: Arc<dyn Http>,
        cache: Arc<dyn GuildCache>,
        registry: Arc<RwLock<CommandRegistry>>,
        app_id: u64,
        owner_override: Option<Vec<u64>>,
    ) -> Self {
        Self {
            http,
            cache,
            registry,
            app_id,
            owner_override,
        }
    }

    /// Run the full sync. Safe to re-run: upserts match existing remote
    /// commands by name and type, so no duplicates are created.
    ///
    /// Global reconciliation fully completes (ids written back) before any
    /// per-guild work, because guild-level permission resolution for global
    /// commands needs their ids.
    pub async fn sync(&self) -> Result<(), SyncError> {
        let pending = { self.registry.read().await.pending().to_vec() };
        let (globals, scoped): (Vec<_>, Vec<_>) =
            pending.iter().cloned().partition(|c| c.is_global());

        info!(
            "Syncing {} global and {} guild-scoped commands...",
            globals.len(),
            scoped.len()
        );

        self.sync_globals(&globals).await?;

        let owners = self.resolve_owners(&pending).await?;

        for command in &globals {
            if command.permissions().iter().any(|p| p.guild_id.is_none()) {
                warn!(
                    "Global command {} declares permission overwrites without a guild_id; they can never apply",
                    command.name()
                );
            }
        }

        let synced_guilds = self.sync_guilds(&scoped).await?;

        self.sync_permissions(&pending, &synced_guilds, &owners).await
    }

    async fn sync_globals(&self, globals: &[Arc<ApplicationCommand>]) -> Result<(), SyncError> {
        let remote = self
            .http
            .get_global_commands(self.app_id)
            .await
            .map_err(|source| SyncError::Global { source })?;

        // carry matched remote ids forward so the upsert updates in place
        let payloads: Vec<CommandPayload> = globals
            .iter()
            .map(|command| {
                let existing = remote
                    .iter()
                    .find(|record| command.matches(record))
                    .and_then(|record| record.id);
                command.payload(existing)
            })
            .collect();

        let returned = self
            .http
            .bulk_upsert_global_commands(self.app_id, payloads)
            .await
            .map_err(|source| SyncError::Global { source })?;

        let mut registry = self.registry.write().await;
        for record in &returned {
            let Some(id) = record.id else {
                warn!("Remote returned global command {} without an id", record.name);
                continue;
            };
            match globals.iter().find(|command| command.matches(record)) {
                Some(command) => registry.record_synced(command, id),
                None => warn!(
                    "Remote returned global command {} matching no local declaration",
                    record.name
                ),
            }
        }
        info!("Registered {} global commands", returned.len());
        Ok(())
    }

    async fn sync_guilds(
        &self,
        scoped: &[Arc<ApplicationCommand>],
    ) -> Result<Vec<Guild>, SyncError> {
        let mut synced = Vec::new();
        for guild in self.cache.guilds() {
            let commands: Vec<_> = scoped
                .iter()
                .filter(|command| command.is_scoped_to(guild.id))
                .cloned()
                .collect();
            // guilds with nothing scoped still get an empty upsert, which
            // clears stale remote commands
            let payloads: Vec<_> = commands.iter().map(|command| command.payload(None)).collect();

            match self
                .http
                .bulk_upsert_guild_commands(self.app_id, guild.id, payloads)
                .await
            {
                Ok(returned) => {
                    let mut registry = self.registry.write().await;
                    for record in &returned {
                        let Some(id) = record.id else { continue };
                        if let Some(command) =
                            commands.iter().find(|command| command.matches(record))
                        {
                            registry.record_synced(command, id);
                        }
                    }
                    drop(registry);
                    info!(
                        "Registered {} commands for guild {}",
                        returned.len(),
                        guild.id
                    );
                    synced.push(guild);
                }
                // a guild we cannot write to only gets skipped when it had
                // nothing pending; losing real registrations is an error
                Err(err) if err.is_forbidden() && commands.is_empty() => {
                    warn!("Missing access to guild {}; skipping command sync", guild.id);
                }
                Err(source) => {
                    error!(
                        "Failed to register commands for guild {}: {}",
                        guild.id, source
                    );
                    return Err(SyncError::Guild {
                        guild_id: guild.id,
                        source,
                    });
                }
            }
        }
        Ok(synced)
    }

    async fn sync_permissions(
        &self,
        pending: &[Arc<ApplicationCommand>],
        guilds: &[Guild],
        owners: &[u64],
    ) -> Result<(), SyncError> {
        let resolver = PermissionResolver::new(owners);
        for guild in guilds {
            let mut payloads = Vec::new();
            for command in pending
                .iter()
                .filter(|command| command.is_global() || command.is_scoped_to(guild.id))
            {
                // globals are guaranteed synced by now; unsynced commands
                // cannot carry permissions
                let Some(id) = command.remote_id() else { continue };
                let permissions = resolver.resolve_command(command, guild);
                if !permissions.is_empty() {
                    payloads.push(CommandPermissions { id, permissions });
                }
            }
            if payloads.is_empty() {
                continue;
            }
            if let Err(source) = self
                .http
                .bulk_upsert_command_permissions(self.app_id, guild.id, payloads)
                .await
            {
                // permission desync is unsafe to ignore
                error!(
                    "Failed to update command permissions for guild {}: {}",
                    guild.id, source
                );
                return Err(SyncError::Permissions {
                    guild_id: guild.id,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Owner ids for `is_owner` overwrites: configuration override first,
    /// otherwise one application-info fetch. Skipped entirely when nothing
    /// declares an owner target.
    async fn resolve_owners(
        &self,
        pending: &[Arc<ApplicationCommand>],
    ) -> Result<Vec<u64>, SyncError> {
        let needs_owner = pending.iter().any(|command| {
            command
                .permissions()
                .iter()
                .any(|p| matches!(p.target, PermissionTarget::Owner))
        });
        if !needs_owner {
            return Ok(Vec::new());
        }
        if let Some(owners) = &self.owner_override {
            return Ok(owners.clone());
        }
        let info = self
            .http
            .application_info()
            .await
            .map_err(|source| SyncError::ApplicationInfo { source })?;
        Ok(info.owner_ids())
    }
}
