//! The narrow collaborator interfaces the game logic consumes from the host.
//!
//! Each trait covers one host service. Game code is written against the
//! umbrella [`Host`] trait, which every type implementing all services gets
//! for free, so tests can swap in [`SimHost`](crate::sim::SimHost) without
//! touching the logic.
//!
//! # Services
//!
//! - [`EntityDirectory`]: name lookup and handle introspection.
//! - [`TemplateSpawner`]: `ForceSpawn` on point templates.
//! - [`InputChannel`]: fire-and-forget entity inputs.
//! - [`ChangeFeed`]: property change subscriptions and delivery.
//! - [`Console`]: inbound chat, server commands, operator messages.
//! - [`Scheduler`]: game clock and the think schedule.
//! - [`ScreenText`]: on-screen debug text, last write wins per region.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handle::ActorHandle;
use crate::HostError;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Opaque token identifying one host-side property subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionToken(pub u64);

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// A property change reported by the host for an active subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    /// The subscription this change is delivered under.
    pub token: SubscriptionToken,
    /// The entity whose property changed.
    pub target: ActorHandle,
    /// The property name, e.g. `"health"`.
    pub property: String,
    /// The new value.
    pub value: f64,
}

/// The player slot a chat message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSlot(pub u32);

/// One inbound chat line. `player` is `None` for messages typed at the
/// server console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub player: Option<PlayerSlot>,
    pub text: String,
}

/// Optional payload of an entity input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    Text(String),
    Number(f64),
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A block of debug text painted on screen.
///
/// `x` and `y` are fractions of the screen size; `duration` is how long the
/// text stays up, in seconds of game time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub duration: f32,
    pub color: Rgb,
}

// ---------------------------------------------------------------------------
// Service traits
// ---------------------------------------------------------------------------

/// Entity lookup and introspection.
pub trait EntityDirectory {
    /// Find a live entity by its exact targetname.
    fn find_by_name(&self, name: &str) -> Option<ActorHandle>;

    /// The targetname of a live entity, or `None` if the handle is stale.
    fn entity_name(&self, handle: ActorHandle) -> Option<&str>;

    /// The engine class of a live entity (e.g. `"func_tracktrain"`), or
    /// `None` if the handle is stale.
    fn class_name(&self, handle: ActorHandle) -> Option<&str>;

    /// Whether the handle still names a live entity.
    fn is_valid(&self, handle: ActorHandle) -> bool {
        self.class_name(handle).is_some()
    }
}

/// Spawning from point templates.
pub trait TemplateSpawner {
    /// Instantiate every entity of the template, returning the new handles
    /// (possibly none).
    fn force_spawn(&mut self, template: ActorHandle) -> Result<Vec<ActorHandle>, HostError>;
}

/// Fire-and-forget entity inputs.
pub trait InputChannel {
    /// Fire `input` at `target`. There is no acknowledgement; inputs at
    /// stale handles are silently dropped by the engine.
    fn fire_input(&mut self, target: ActorHandle, input: &str, value: Option<InputValue>);
}

/// Property change subscriptions.
pub trait ChangeFeed {
    /// Ask the host to report changes of `property` on `target`.
    fn subscribe(
        &mut self,
        target: ActorHandle,
        property: &str,
    ) -> Result<SubscriptionToken, HostError>;

    /// Cancel a subscription. Returns `false` if the token was not active.
    fn unsubscribe(&mut self, token: SubscriptionToken) -> bool;

    /// Take every change reported since the last call, in delivery order.
    fn drain_changes(&mut self) -> Vec<PropertyChange>;
}

/// Chat in, server commands and operator messages out.
pub trait Console {
    /// Take every chat line received since the last call.
    fn drain_chat(&mut self) -> Vec<ChatMessage>;

    /// Execute a server console command.
    fn server_command(&mut self, command: &str);

    /// Print an operator-visible message.
    fn msg(&mut self, text: &str);
}

/// Game clock and think scheduling.
pub trait Scheduler {
    /// Current game time in seconds.
    fn game_time(&self) -> f64;

    /// Arm the next think at an absolute game time.
    fn set_next_think(&mut self, at: f64);

    /// The currently armed think time, if any.
    fn next_think(&self) -> Option<f64>;

    /// Whether the armed think time has been reached.
    fn think_due(&self) -> bool {
        self.next_think().is_some_and(|at| self.game_time() >= at)
    }
}

/// On-screen debug text.
pub trait ScreenText {
    /// Paint text; replaces whatever was last painted in the same region.
    fn debug_screen_text(&mut self, text: DebugText);
}

/// Every host service at once.
pub trait Host:
    EntityDirectory + TemplateSpawner + InputChannel + ChangeFeed + Console + Scheduler + ScreenText
{
}

impl<T> Host for T where
    T: EntityDirectory
        + TemplateSpawner
        + InputChannel
        + ChangeFeed
        + Console
        + Scheduler
        + ScreenText
{
}
