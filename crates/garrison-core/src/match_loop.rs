//! The match: the one object that owns the host, the rosters, and the
//! overlay, driven one host frame at a time.
//!
//! # Frame order
//!
//! Each call to [`TowerDefenseMatch::frame`] does, in order:
//!
//! 1. Drain chat and apply every command (spawns, removals).
//! 2. Drain property changes and deliver each to its troop. A troop whose
//!    health reaches zero tears itself down here, but stays in its roster
//!    (hidden) until the next think.
//! 3. If the armed think time has been reached, [`think`](TowerDefenseMatch::think):
//!    compact the rosters, paint the game time and the table, and re-arm.
//!
//! So everything that happened in a frame is visible to that frame's render.

use garrison_host::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::capability::Capability;
use crate::commands::{ChatCommand, CommandError};
use crate::config::{ConfigurationError, MatchConfig};
use crate::debug_menu::{DebugColumn, DebugMenu};
use crate::entities::GameEntities;
use crate::roster::{Faction, FactionRoster};
use crate::server::apply_presets;
use crate::subscription::SubscriptionRegistry;
use crate::troop::{Classification, HealthOutcome, Troop, TroopError, TroopId, TroopKey};

/// Console reply to a chat line that is not a command.
pub const INVALID_COMMAND_MSG: &str = "Invalid Command";

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Why a spawn request failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnError {
    #[error("no lane '{lane}' for {faction}")]
    UnknownLane { faction: Faction, lane: String },

    #[error("no template for {kind}")]
    MissingTemplate { kind: Classification },

    #[error(transparent)]
    Troop(#[from] TroopError),
}

/// What one chat line did.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// Sent by no player; not looked at.
    Ignored,
    Spawned(TroopKey),
    /// Number of troops removed.
    Cleared(usize),
    Rejected(CommandError),
    Failed(SpawnError),
}

/// Lifetime counters of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchDiagnostics {
    pub frames: u64,
    pub thinks: u64,
    pub troops_spawned: u64,
    pub troops_removed: u64,
    pub spawns_failed: u64,
    pub commands_rejected: u64,
    /// Changes that arrived for a subscription already cancelled.
    pub stale_changes_dropped: u64,
}

// ---------------------------------------------------------------------------
// TowerDefenseMatch
// ---------------------------------------------------------------------------

/// A running match.
#[derive(Debug)]
pub struct TowerDefenseMatch<H: Host> {
    host: H,
    config: MatchConfig,
    entities: GameEntities,
    registry: SubscriptionRegistry<TroopKey>,
    rosters: [FactionRoster; 2],
    menu: DebugMenu,
    displayed: Vec<Faction>,
    next_troop_id: u64,
    diagnostics: MatchDiagnostics,
}

fn slot(faction: Faction) -> usize {
    match faction {
        Faction::CounterTerrorist => 0,
        Faction::Terrorist => 1,
    }
}

impl<H: Host> TowerDefenseMatch<H> {
    /// Validate `config`, resolve the map, issue the server presets, and arm
    /// the first think.
    ///
    /// A missing or malformed map entity is fatal: it is reported on the
    /// host console and returned, and nothing is scheduled.
    pub fn start(mut host: H, config: MatchConfig) -> Result<Self, ConfigurationError> {
        let resolved = config
            .validate()
            .and_then(|()| GameEntities::resolve(&host, &config));
        let entities = match resolved {
            Ok(entities) => entities,
            Err(e) => {
                error!(error = %e, "match cannot start");
                host.msg(&format!("Match cannot start: {e}"));
                return Err(e);
            }
        };

        apply_presets(&mut host, &config);

        let first_think = host.game_time() + config.first_think_delay;
        host.set_next_think(first_think);
        info!(first_think, lanes = config.lanes.len(), "match started");

        Ok(Self {
            menu: DebugMenu::new(config.overlay),
            host,
            config,
            entities,
            registry: SubscriptionRegistry::new(),
            rosters: Faction::ALL.map(FactionRoster::new),
            displayed: Faction::ALL.to_vec(),
            next_troop_id: 0,
            diagnostics: MatchDiagnostics::default(),
        })
    }

    /// Run one host frame. Returns `true` if a think ran.
    pub fn frame(&mut self) -> bool {
        self.diagnostics.frames += 1;

        for message in self.host.drain_chat() {
            self.handle_chat(&message);
        }
        self.deliver_changes();

        if self.host.think_due() {
            self.think();
            true
        } else {
            false
        }
    }

    /// Compact the rosters, paint the overlay, and re-arm the next think.
    pub fn think(&mut self) {
        for roster in &mut self.rosters {
            roster.compact();
        }

        self.menu.display_game_time(&mut self.host);
        let columns: Vec<&dyn DebugColumn> = self
            .displayed
            .iter()
            .map(|&f| &self.rosters[slot(f)] as &dyn DebugColumn)
            .collect();
        self.menu.display_columns(&mut self.host, &columns);

        let next = self.host.game_time() + self.config.think_interval;
        self.host.set_next_think(next);
        self.diagnostics.thinks += 1;
        trace!(next, "think complete");
    }

    /// Apply one chat line.
    pub fn handle_chat(&mut self, message: &ChatMessage) -> ChatOutcome {
        if message.player.is_none() {
            trace!(text = %message.text, "ignoring chat from no player");
            return ChatOutcome::Ignored;
        }

        let command = match ChatCommand::parse(&message.text) {
            Ok(command) => command,
            Err(e) => {
                self.diagnostics.commands_rejected += 1;
                debug!(error = %e, "chat command rejected");
                let reply = match &e {
                    CommandError::Unknown { .. } => INVALID_COMMAND_MSG.to_owned(),
                    CommandError::BadArgument { .. } => e.to_string(),
                };
                self.host.msg(&reply);
                return ChatOutcome::Rejected(e);
            }
        };

        match command {
            ChatCommand::Spawn {
                kind,
                faction,
                lane,
            } => {
                let faction = faction.unwrap_or(Faction::CounterTerrorist);
                let lane = lane.unwrap_or_else(|| self.config.default_lane().to_owned());
                match self.spawn_troop(faction, &lane, kind) {
                    Ok(key) => ChatOutcome::Spawned(key),
                    Err(e) => {
                        self.host.msg(&format!("Failed to spawn {}: {e}", kind.suffix()));
                        ChatOutcome::Failed(e)
                    }
                }
            }
            ChatCommand::Clear { faction } => {
                let factions = match faction {
                    Some(f) => vec![f],
                    None => Faction::ALL.to_vec(),
                };
                let cleared = factions
                    .into_iter()
                    .map(|f| self.clear_faction(f))
                    .sum::<usize>();
                self.host.msg(&format!("Cleared {cleared} troops."));
                ChatOutcome::Cleared(cleared)
            }
        }
    }

    /// Spawn a troop of `kind` at the start of a lane.
    pub fn spawn_troop(
        &mut self,
        faction: Faction,
        lane: &str,
        kind: Classification,
    ) -> Result<TroopKey, SpawnError> {
        let start = self
            .entities
            .lane_start(faction, lane)
            .ok_or_else(|| SpawnError::UnknownLane {
                faction,
                lane: lane.to_owned(),
            })?;
        let template = self
            .entities
            .template(kind)
            .ok_or(SpawnError::MissingTemplate { kind })?;

        self.next_troop_id += 1;
        let key = TroopKey {
            faction,
            id: TroopId(self.next_troop_id),
        };

        let troop = match Troop::spawn(
            &mut self.host,
            &mut self.registry,
            key,
            template,
            start,
            self.config.troop_params(),
        ) {
            Ok(troop) => troop,
            Err(e) => {
                self.diagnostics.spawns_failed += 1;
                warn!(troop = %key, %kind, error = %e, "troop spawn failed");
                return Err(e.into());
            }
        };
        self.rosters[slot(faction)].add(troop);
        self.diagnostics.troops_spawned += 1;

        let node = start.name(&self.host).unwrap_or_default().to_owned();
        info!(troop = %key, %kind, %node, "troop spawned");
        self.host.msg(&format!(
            "{} spawned at {node} and is now moving.",
            kind.suffix()
        ));
        Ok(key)
    }

    /// Explicitly remove one troop. Returns `false` if it is not in its
    /// roster.
    pub fn remove_troop(&mut self, key: TroopKey) -> bool {
        let roster = &mut self.rosters[slot(key.faction)];
        let was_alive = roster.contains(key);
        let removed = roster.remove(key, &mut self.host, &mut self.registry);
        if was_alive {
            self.diagnostics.troops_removed += 1;
        }
        removed
    }

    /// Remove every troop of `faction`. Returns how many were alive.
    pub fn clear_faction(&mut self, faction: Faction) -> usize {
        let roster = &mut self.rosters[slot(faction)];
        let destroyed = roster.destroy_all(&mut self.host, &mut self.registry);
        roster.compact();
        self.diagnostics.troops_removed += destroyed as u64;
        if destroyed > 0 {
            info!(%faction, destroyed, "faction cleared");
        }
        destroyed
    }

    fn deliver_changes(&mut self) {
        for change in self.host.drain_changes() {
            let Some(key) = self.registry.route(&change) else {
                self.diagnostics.stale_changes_dropped += 1;
                trace!(
                    token = %change.token,
                    target = %change.target,
                    "dropping change for inactive subscription"
                );
                continue;
            };
            let outcome = self.rosters[slot(key.faction)].observe_health(
                key,
                change.value,
                &mut self.host,
                &mut self.registry,
            );
            if outcome == Some(HealthOutcome::Died) {
                self.diagnostics.troops_removed += 1;
                info!(troop = %key, "troop died");
            }
        }
    }

    // -- columns ------------------------------------------------------------

    /// Show `faction`'s roster as another table column.
    pub fn add_column(&mut self, faction: Faction) {
        self.displayed.push(faction);
    }

    /// Remove every column from the table.
    pub fn clear_columns(&mut self) {
        self.displayed.clear();
    }

    /// Factions shown in the table, left to right.
    pub fn columns(&self) -> &[Faction] {
        &self.displayed
    }

    // -- accessors ----------------------------------------------------------

    pub fn roster(&self, faction: Faction) -> &FactionRoster {
        &self.rosters[slot(faction)]
    }

    pub fn diagnostics(&self) -> MatchDiagnostics {
        self.diagnostics
    }

    pub fn menu(&self) -> &DebugMenu {
        &self.menu
    }

    pub fn entities(&self) -> &GameEntities {
        &self.entities
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Live health subscriptions.
    pub fn subscriptions(&self) -> &SubscriptionRegistry<TroopKey> {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
