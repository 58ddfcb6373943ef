//! Garrison Host -- the boundary between troop logic and the game engine.
//!
//! The engine owns every entity. Game code only ever holds [`ActorHandle`]s,
//! generational references that go stale when the engine destroys the
//! entity, and talks to the engine through the small service traits in
//! [`api`]. [`sim::SimHost`] implements all of them in memory.
//!
//! # Quick Start
//!
//! ```
//! use garrison_host::prelude::*;
//!
//! let mut host = SimHost::new();
//! let node = host.add_entity(EntitySpec::new("ct_path.a.1", "path_track"));
//!
//! assert_eq!(host.find_by_name("ct_path.a.1"), Some(node));
//! assert_eq!(host.class_name(node), Some("path_track"));
//!
//! host.fire_input(node, "Kill", None);
//! assert!(!host.is_valid(node));
//! ```

#![deny(unsafe_code)]

pub mod api;
pub mod handle;
pub mod sim;

pub use handle::ActorHandle;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors reported by host services.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// The handle no longer names a live entity.
    #[error("entity {handle} is gone (stale handle)")]
    StaleHandle { handle: ActorHandle },

    /// `ForceSpawn` was called on something that is not a point template.
    #[error("entity {handle} is not a point_template")]
    NotATemplate { handle: ActorHandle },

    /// A numeric property was read that the entity does not carry.
    #[error("entity {handle} has no property '{property}'")]
    MissingProperty {
        handle: ActorHandle,
        property: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::api::{
        ChangeFeed, ChatMessage, Console, DebugText, EntityDirectory, Host, InputChannel,
        InputValue, PlayerSlot, PropertyChange, Rgb, Scheduler, ScreenText, SubscriptionToken,
        TemplateSpawner,
    };
    pub use crate::handle::{ActorHandle, EntitySlots};
    pub use crate::sim::{
        Blueprint, EntitySpec, FiredInput, SimHost, SimStats, TemplateSpec, POINT_TEMPLATE_CLASS,
    };
    pub use crate::HostError;
}
