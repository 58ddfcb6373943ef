//! Garrison Core -- troop management for a point-script tower defense match.
//!
//! Troops are spawned from map point templates, walk a predefined lane, and
//! are torn down when their prop's health reaches zero. Every think the
//! match paints a table of live troops per faction.
//!
//! The pieces, leaves first:
//!
//! - [`capability`]: typed, class-checked views over host handles.
//! - [`subscription`]: at most one live property subscription per
//!   (entity, property), routed to a listener key.
//! - [`troop`]: one troop's lifecycle, `Spawning -> Moving -> Dying -> Removed`.
//! - [`roster`]: the troops of one faction, with two-phase removal.
//! - [`debug_menu`]: the on-screen table renderer.
//! - [`match_loop`]: the match that owns all of the above.
//!
//! # Quick Start
//!
//! ```
//! use garrison_core::prelude::*;
//! use garrison_host::prelude::*;
//!
//! let config = MatchConfig::default();
//! let host = SimHost::from_blueprint(&GameEntities::blueprint(&config));
//! let mut game = TowerDefenseMatch::start(host, config).unwrap();
//!
//! game.host_mut().push_chat(Some(PlayerSlot(1)), "!vase");
//! game.host_mut().advance_clock(0.125);
//! assert!(game.frame());
//! assert_eq!(game.roster(Faction::CounterTerrorist).count(), 1);
//! ```

#![deny(unsafe_code)]

pub mod capability;
pub mod commands;
pub mod config;
pub mod debug_menu;
pub mod entities;
pub mod match_loop;
pub mod roster;
pub mod server;
pub mod subscription;
pub mod troop;

/// Re-export the host crate for convenience.
pub use garrison_host;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::capability::{
        cast, CastError, Capability, PathTrack, PhysicsProp, PointTemplate, TrackTrain,
    };
    pub use crate::commands::{ChatCommand, CommandError};
    pub use crate::config::{ConfigurationError, MatchConfig, OverlayConfig, TextSlot};
    pub use crate::debug_menu::{render_table, DebugColumn, DebugMenu, Debuggable};
    pub use crate::entities::GameEntities;
    pub use crate::match_loop::{ChatOutcome, MatchDiagnostics, SpawnError, TowerDefenseMatch};
    pub use crate::roster::{Faction, FactionRoster};
    pub use crate::subscription::{SubscriptionError, SubscriptionRegistry};
    pub use crate::troop::{
        Classification, ClassificationError, HealthOutcome, Troop, TroopError, TroopId, TroopKey,
        TroopParams, TroopState,
    };
}
