//! In-memory host engine.
//!
//! [`SimHost`] implements every service trait of [`crate::api`] on plain
//! data structures. It is deterministic: subscriptions, spawned names, and
//! queued events are ordered, and nothing depends on wall-clock time.
//!
//! A host is built from a [`Blueprint`] listing the named map entities and
//! the point templates. Templates are entities too (class
//! `point_template`); their contents are only instantiated by
//! [`force_spawn`](crate::api::TemplateSpawner::force_spawn).
//!
//! # Example
//!
//! ```
//! use garrison_host::prelude::*;
//!
//! let blueprint = Blueprint {
//!     entities: vec![EntitySpec::new("ct_path.a.1", "path_track")],
//!     templates: vec![TemplateSpec {
//!         name: "template.troop.door".to_owned(),
//!         contents: vec![
//!             EntitySpec::new("train.door", "func_tracktrain"),
//!             EntitySpec::new("mdl.door", "prop_physics_multiplayer").with_property("health", 100.0),
//!         ],
//!     }],
//! };
//! let mut host = SimHost::from_blueprint(&blueprint);
//!
//! let template = host.find_by_name("template.troop.door").unwrap();
//! let spawned = host.force_spawn(template).unwrap();
//! assert_eq!(spawned.len(), 2);
//! assert!(host.entity_name(spawned[0]).unwrap().starts_with("train.door"));
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::{
    ChangeFeed, ChatMessage, Console, DebugText, EntityDirectory, InputChannel, InputValue,
    PlayerSlot, PropertyChange, Scheduler, ScreenText, SubscriptionToken, TemplateSpawner,
};
use crate::handle::{ActorHandle, EntitySlots};
use crate::HostError;

/// Engine class of point templates.
pub const POINT_TEMPLATE_CLASS: &str = "point_template";

// ---------------------------------------------------------------------------
// Blueprint
// ---------------------------------------------------------------------------

/// One entity to place in the map or inside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub class_name: String,
    /// Initial numeric properties, e.g. `("health", 100.0)`.
    #[serde(default)]
    pub properties: Vec<(String, f64)>,
}

impl EntitySpec {
    pub fn new(name: &str, class_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: &str, value: f64) -> Self {
        self.properties.push((property.to_owned(), value));
        self
    }
}

/// A named point template and the entities it instantiates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub contents: Vec<EntitySpec>,
}

/// Everything a [`SimHost`] map contains at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub entities: Vec<EntitySpec>,
    pub templates: Vec<TemplateSpec>,
}

// ---------------------------------------------------------------------------
// Recorded output
// ---------------------------------------------------------------------------

/// An input fired at an entity, as recorded by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredInput {
    pub target: ActorHandle,
    pub input: String,
    pub value: Option<InputValue>,
    /// Game time the input was fired at.
    pub at: f64,
}

/// Counters over the host's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Entities created by `force_spawn`.
    pub spawned: u64,
    /// Entities removed via the `Kill` input.
    pub killed: u64,
    /// Subscriptions accepted.
    pub subscribed: u64,
    /// Unsubscribe calls that cancelled an active subscription.
    pub unsubscribed: u64,
}

// ---------------------------------------------------------------------------
// SimEntity
// ---------------------------------------------------------------------------

/// Host-side state of one entity.
#[derive(Debug, Clone)]
struct SimEntity {
    name: String,
    class_name: String,
    properties: BTreeMap<String, f64>,
    /// Path node the entity was last teleported to.
    path_node: Option<String>,
    speed: f64,
    moving: bool,
}

impl SimEntity {
    fn from_spec(spec: &EntitySpec, name: String) -> Self {
        Self {
            name,
            class_name: spec.class_name.clone(),
            properties: spec.properties.iter().cloned().collect(),
            path_node: None,
            speed: 0.0,
            moving: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SimHost
// ---------------------------------------------------------------------------

/// A deterministic, in-memory host engine.
#[derive(Debug, Default)]
pub struct SimHost {
    entities: EntitySlots<SimEntity>,
    /// Contents of each point template, keyed by the template's handle.
    templates: HashMap<ActorHandle, Vec<EntitySpec>>,
    /// Serial appended to spawned names (`name&0001`).
    spawn_serial: u32,
    subscriptions: BTreeMap<SubscriptionToken, (ActorHandle, String)>,
    next_token: u64,
    pending_changes: Vec<PropertyChange>,
    pending_chat: Vec<ChatMessage>,
    fired_inputs: Vec<FiredInput>,
    console_log: Vec<String>,
    server_commands: Vec<String>,
    /// Latest text per screen region, keyed by the bit patterns of (x, y).
    screen: BTreeMap<(u32, u32), DebugText>,
    clock: f64,
    next_think: Option<f64>,
    stats: SimStats,
}

impl SimHost {
    /// Create an empty host with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host and place every entity and template of `blueprint`.
    pub fn from_blueprint(blueprint: &Blueprint) -> Self {
        let mut host = Self::new();
        host.load(blueprint);
        host
    }

    /// Place the entities and templates of `blueprint` into this host.
    pub fn load(&mut self, blueprint: &Blueprint) {
        for spec in &blueprint.entities {
            self.add_entity(spec.clone());
        }
        for template in &blueprint.templates {
            self.add_template(template.clone());
        }
        debug!(
            entities = blueprint.entities.len(),
            templates = blueprint.templates.len(),
            "sim host loaded blueprint"
        );
    }

    /// Place one named entity, keeping its name verbatim.
    pub fn add_entity(&mut self, spec: EntitySpec) -> ActorHandle {
        let entity = SimEntity::from_spec(&spec, spec.name.clone());
        self.entities.insert(entity)
    }

    /// Place a point template entity.
    pub fn add_template(&mut self, template: TemplateSpec) -> ActorHandle {
        let handle = self.add_entity(EntitySpec::new(&template.name, POINT_TEMPLATE_CLASS));
        self.templates.insert(handle, template.contents);
        handle
    }

    // -- driving the simulation ---------------------------------------------

    /// Queue a chat line as if typed by `player`.
    pub fn push_chat(&mut self, player: Option<PlayerSlot>, text: &str) {
        self.pending_chat.push(ChatMessage {
            player,
            text: text.to_owned(),
        });
    }

    /// Set a numeric property, queueing a change for every subscription on
    /// that (entity, property) pair.
    pub fn set_property(
        &mut self,
        target: ActorHandle,
        property: &str,
        value: f64,
    ) -> Result<(), HostError> {
        let entity = self
            .entities
            .get_mut(target)
            .ok_or(HostError::StaleHandle { handle: target })?;
        entity.properties.insert(property.to_owned(), value);

        for (&token, (sub_target, sub_property)) in &self.subscriptions {
            if *sub_target == target && sub_property == property {
                self.pending_changes.push(PropertyChange {
                    token,
                    target,
                    property: property.to_owned(),
                    value,
                });
            }
        }
        trace!(%target, property, value, "sim property set");
        Ok(())
    }

    /// Subtract `amount` from the entity's `health`, returning the new value.
    pub fn apply_damage(&mut self, target: ActorHandle, amount: f64) -> Result<f64, HostError> {
        let current = self
            .property(target, "health")
            .ok_or_else(|| HostError::MissingProperty {
                handle: target,
                property: "health".to_owned(),
            })?;
        let next = current - amount;
        self.set_property(target, "health", next)?;
        Ok(next)
    }

    /// Move the game clock forward by `dt` seconds.
    pub fn advance_clock(&mut self, dt: f64) {
        self.clock += dt;
    }

    // -- inspection ----------------------------------------------------------

    /// Read a numeric property of a live entity.
    pub fn property(&self, target: ActorHandle, property: &str) -> Option<f64> {
        self.entities
            .get(target)
            .and_then(|e| e.properties.get(property).copied())
    }

    /// The path node the entity was last teleported to.
    pub fn path_node(&self, target: ActorHandle) -> Option<&str> {
        self.entities
            .get(target)
            .and_then(|e| e.path_node.as_deref())
    }

    /// The entity's last set speed.
    pub fn speed(&self, target: ActorHandle) -> Option<f64> {
        self.entities.get(target).map(|e| e.speed)
    }

    /// Whether the entity has been started forward and not stopped.
    pub fn is_moving(&self, target: ActorHandle) -> bool {
        self.entities.get(target).is_some_and(|e| e.moving)
    }

    /// Number of live entities, templates included.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of active host-side subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Every input fired so far, in order.
    pub fn fired_inputs(&self) -> &[FiredInput] {
        &self.fired_inputs
    }

    /// Inputs fired at one entity, in order.
    pub fn inputs_for(&self, target: ActorHandle) -> Vec<&FiredInput> {
        self.fired_inputs
            .iter()
            .filter(|i| i.target == target)
            .collect()
    }

    /// Every operator message printed so far.
    pub fn console_log(&self) -> &[String] {
        &self.console_log
    }

    /// Every server command executed so far.
    pub fn server_commands(&self) -> &[String] {
        &self.server_commands
    }

    /// The text currently painted at a region, if any.
    pub fn screen_text_at(&self, x: f32, y: f32) -> Option<&DebugText> {
        self.screen.get(&(x.to_bits(), y.to_bits()))
    }

    /// Every painted region's current text.
    pub fn screen_texts(&self) -> impl Iterator<Item = &DebugText> {
        self.screen.values()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    // -- internals -----------------------------------------------------------

    fn kill(&mut self, target: ActorHandle) {
        if self.entities.remove(target).is_none() {
            return;
        }
        self.templates.remove(&target);
        self.subscriptions.retain(|_, (t, _)| *t != target);
        self.stats.killed += 1;
        trace!(%target, "sim entity killed");
    }
}

// ---------------------------------------------------------------------------
// Service implementations
// ---------------------------------------------------------------------------

impl EntityDirectory for SimHost {
    fn find_by_name(&self, name: &str) -> Option<ActorHandle> {
        // Lowest slot wins when names collide, matching the engine's
        // first-found order.
        self.entities
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(h, _)| h)
    }

    fn entity_name(&self, handle: ActorHandle) -> Option<&str> {
        self.entities.get(handle).map(|e| e.name.as_str())
    }

    fn class_name(&self, handle: ActorHandle) -> Option<&str> {
        self.entities.get(handle).map(|e| e.class_name.as_str())
    }
}

impl TemplateSpawner for SimHost {
    fn force_spawn(&mut self, template: ActorHandle) -> Result<Vec<ActorHandle>, HostError> {
        if !self.entities.contains(template) {
            return Err(HostError::StaleHandle { handle: template });
        }
        let contents = self
            .templates
            .get(&template)
            .cloned()
            .ok_or(HostError::NotATemplate { handle: template })?;

        let mut spawned = Vec::with_capacity(contents.len());
        for spec in &contents {
            self.spawn_serial += 1;
            let name = format!("{}&{:04}", spec.name, self.spawn_serial);
            spawned.push(self.entities.insert(SimEntity::from_spec(spec, name)));
        }
        self.stats.spawned += spawned.len() as u64;
        debug!(%template, count = spawned.len(), "sim template spawned");
        Ok(spawned)
    }
}

impl InputChannel for SimHost {
    fn fire_input(&mut self, target: ActorHandle, input: &str, value: Option<InputValue>) {
        self.fired_inputs.push(FiredInput {
            target,
            input: input.to_owned(),
            value: value.clone(),
            at: self.clock,
        });

        if input == "Kill" {
            self.kill(target);
            return;
        }
        let Some(entity) = self.entities.get_mut(target) else {
            return;
        };
        match (input, value) {
            ("TeleportToPathNode", Some(InputValue::Text(node))) => entity.path_node = Some(node),
            ("SetSpeedReal", Some(InputValue::Number(speed))) => entity.speed = speed,
            ("StartForward", _) => entity.moving = true,
            ("Stop", _) => entity.moving = false,
            _ => {}
        }
    }
}

impl ChangeFeed for SimHost {
    fn subscribe(
        &mut self,
        target: ActorHandle,
        property: &str,
    ) -> Result<SubscriptionToken, HostError> {
        if !self.entities.contains(target) {
            return Err(HostError::StaleHandle { handle: target });
        }
        self.next_token += 1;
        let token = SubscriptionToken(self.next_token);
        self.subscriptions
            .insert(token, (target, property.to_owned()));
        self.stats.subscribed += 1;
        Ok(token)
    }

    fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let removed = self.subscriptions.remove(&token).is_some();
        if removed {
            self.stats.unsubscribed += 1;
        }
        removed
    }

    fn drain_changes(&mut self) -> Vec<PropertyChange> {
        std::mem::take(&mut self.pending_changes)
    }
}

impl Console for SimHost {
    fn drain_chat(&mut self) -> Vec<ChatMessage> {
        std::mem::take(&mut self.pending_chat)
    }

    fn server_command(&mut self, command: &str) {
        self.server_commands.push(command.to_owned());
    }

    fn msg(&mut self, text: &str) {
        self.console_log.push(text.to_owned());
    }
}

impl Scheduler for SimHost {
    fn game_time(&self) -> f64 {
        self.clock
    }

    fn set_next_think(&mut self, at: f64) {
        self.next_think = Some(at);
    }

    fn next_think(&self) -> Option<f64> {
        self.next_think
    }
}

impl ScreenText for SimHost {
    fn debug_screen_text(&mut self, text: DebugText) {
        self.screen.insert((text.x.to_bits(), text.y.to_bits()), text);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
