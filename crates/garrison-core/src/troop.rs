//! Troops: one spawned mover/prop pair and its lifecycle.
//!
//! A troop is created from a point template. The template's name decides the
//! [`Classification`]; the entities it spawns supply the mover (a
//! `func_tracktrain` named `train.<kind>...`) and the damageable body (a
//! `prop_physics_multiplayer` named `mdl.<kind>...`).
//!
//! # Lifecycle
//!
//! ```text
//! Spawning --deploy--> Moving --health <= 0--> Dying --> Removed
//!                         \________destroy()________/
//! ```
//!
//! - **Spawning**: template fired, handles being resolved and checked.
//! - **Moving**: health subscription live, movement started.
//! - **Dying**: death observed or removal requested; teardown in progress.
//! - **Removed**: terminal. Subscription cancelled, both entities killed.
//!
//! Construction either yields a `Moving` troop or fails having killed every
//! entity the template produced, so a failed spawn leaves nothing behind.
//! [`Troop::destroy`] is idempotent.

use std::fmt;
use std::str::FromStr;

use garrison_host::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capability::{
    cast, CastError, Capability, PathTrack, PhysicsProp, PointTemplate, TrackTrain, KILL_INPUT,
};
use crate::debug_menu::Debuggable;
use crate::roster::Faction;
use crate::subscription::{SubscriptionError, SubscriptionRegistry};

/// Name prefix shared by every troop template.
pub const TEMPLATE_PREFIX: &str = "template.troop.";

/// Property the troop watches on its prop.
pub const HEALTH_PROPERTY: &str = "health";

/// Default mover speed, in engine units per second.
pub const DEFAULT_SPEED: f64 = 500.0;

/// Health a troop reports before the first change arrives.
pub const SPAWN_HEALTH: f64 = 100.0;

/// Fractional digits shown for health.
pub const HEALTH_PRECISION: usize = 3;

/// Upper bound on displayed health digits.
pub const MAX_HEALTH_PRECISION: usize = 16;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The kind of a troop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    Door,
    Vase,
    Statue,
    Gallon,
    Liter,
    Flower,
}

/// A name that matches no classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not determine troop classification from '{name}'")]
pub struct ClassificationError {
    pub name: String,
}

impl Classification {
    /// Every classification, in display order.
    pub const ALL: [Classification; 6] = [
        Classification::Door,
        Classification::Vase,
        Classification::Statue,
        Classification::Gallon,
        Classification::Liter,
        Classification::Flower,
    ];

    /// Upper-case label, e.g. `"DOOR"`.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Door => "DOOR",
            Classification::Vase => "VASE",
            Classification::Statue => "STATUE",
            Classification::Gallon => "GALLON",
            Classification::Liter => "LITER",
            Classification::Flower => "FLOWER",
        }
    }

    /// Lower-case naming suffix, e.g. `"door"`.
    pub fn suffix(self) -> &'static str {
        match self {
            Classification::Door => "door",
            Classification::Vase => "vase",
            Classification::Statue => "statue",
            Classification::Gallon => "gallon",
            Classification::Liter => "liter",
            Classification::Flower => "flower",
        }
    }

    /// Look up a naming suffix, ignoring ASCII case.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.suffix().eq_ignore_ascii_case(suffix))
    }

    /// Resolve a template name such as `template.troop.vase`.
    pub fn from_template_name(name: &str) -> Result<Self, ClassificationError> {
        name.strip_prefix(TEMPLATE_PREFIX)
            .and_then(Self::from_suffix)
            .ok_or_else(|| ClassificationError {
                name: name.to_owned(),
            })
    }

    /// The template that spawns this kind.
    pub fn template_name(self) -> String {
        format!("{TEMPLATE_PREFIX}{}", self.suffix())
    }

    /// Name prefix of the spawned mover.
    pub fn mover_prefix(self) -> String {
        format!("train.{}", self.suffix())
    }

    /// Name prefix of the spawned prop.
    pub fn prop_prefix(self) -> String {
        format!("mdl.{}", self.suffix())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Classification {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_suffix(s).ok_or_else(|| ClassificationError { name: s.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Per-match troop number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TroopId(pub u64);

/// Globally unique troop identity: faction plus number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TroopKey {
    pub faction: Faction,
    pub id: TroopId,
}

impl fmt::Display for TroopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.faction.label(), self.id.0)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where a troop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TroopState {
    Spawning,
    Moving,
    Dying,
    Removed,
}

/// What a health update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Value stored, troop still alive.
    Updated,
    /// Value was at or below zero; the troop is now removed.
    Died,
    /// The troop was already dying or removed.
    Ignored,
}

/// Tunables for spawning a troop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TroopParams {
    pub speed: f64,
    pub spawn_health: f64,
    pub health_precision: usize,
}

impl Default for TroopParams {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            spawn_health: SPAWN_HEALTH,
            health_precision: HEALTH_PRECISION,
        }
    }
}

// ---------------------------------------------------------------------------
// TroopError
// ---------------------------------------------------------------------------

/// Why a troop could not be created.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TroopError {
    #[error(transparent)]
    UnknownClassification(#[from] ClassificationError),

    /// The template did not produce the expected mover or prop.
    #[error("template '{template}' spawned no entity named '{missing}*'")]
    IncompleteSpawn { template: String, missing: String },

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error(transparent)]
    Host(#[from] HostError),
}

// ---------------------------------------------------------------------------
// Troop
// ---------------------------------------------------------------------------

/// One live (or formerly live) troop.
#[derive(Debug)]
pub struct Troop {
    key: TroopKey,
    classification: Classification,
    mover: TrackTrain,
    prop: PhysicsProp,
    /// Template entities that are neither mover nor prop; killed with the troop.
    extras: Vec<ActorHandle>,
    health: f64,
    token: Option<SubscriptionToken>,
    state: TroopState,
    health_precision: usize,
}

impl Troop {
    /// Spawn a troop from `template` and start it moving from `start`.
    ///
    /// The classification is resolved before anything is spawned. Once the
    /// template has fired, any failure kills every spawned entity before the
    /// error is returned.
    pub fn spawn<H: Host + ?Sized>(
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
        key: TroopKey,
        template: PointTemplate,
        start: PathTrack,
        params: TroopParams,
    ) -> Result<Troop, TroopError> {
        let template_name = template
            .name(&*host)
            .ok_or(HostError::StaleHandle {
                handle: template.handle(),
            })?
            .to_owned();
        let classification = Classification::from_template_name(&template_name)?;

        let spawned = template.force_spawn(host)?;
        let (mover, prop) = match resolve_pair(&*host, &template_name, classification, &spawned) {
            Ok(pair) => pair,
            Err(e) => {
                discard(host, &spawned);
                return Err(e);
            }
        };

        let extras = spawned
            .iter()
            .copied()
            .filter(|&h| h != mover.handle() && h != prop.handle())
            .collect();
        let mut troop = Troop {
            key,
            classification,
            mover,
            prop,
            extras,
            health: params.spawn_health,
            token: None,
            state: TroopState::Spawning,
            health_precision: params.health_precision.min(MAX_HEALTH_PRECISION),
        };

        if let Err(e) = troop.deploy(host, registry, start, params.speed) {
            warn!(troop = %key, error = %e, "troop deploy failed, discarding spawn");
            if let Some(token) = troop.token.take() {
                registry.unsubscribe(host, token);
            }
            discard(host, &spawned);
            return Err(e);
        }
        Ok(troop)
    }

    /// Subscribe to health and start moving.
    fn deploy<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
        start: PathTrack,
        speed: f64,
    ) -> Result<(), TroopError> {
        let token = registry.subscribe(host, self.prop.handle(), HEALTH_PROPERTY, self.key)?;
        self.token = Some(token);
        self.mover.teleport_to_path_and_start(host, start, speed)?;
        self.transition(TroopState::Moving);
        Ok(())
    }

    /// Record a health change. A value at or below zero kills the troop.
    ///
    /// Values may go up as well as down; only the crossing to zero matters.
    pub fn observe_health<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
        value: f64,
    ) -> HealthOutcome {
        if !self.is_alive() {
            return HealthOutcome::Ignored;
        }
        self.health = value;
        if value <= 0.0 {
            self.transition(TroopState::Dying);
            self.destroy(host, registry);
            HealthOutcome::Died
        } else {
            HealthOutcome::Updated
        }
    }

    /// Tear the troop down: cancel the subscription and kill every entity
    /// the template produced.
    ///
    /// Returns `false` without side effects if the troop is already removed.
    pub fn destroy<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
    ) -> bool {
        if self.state == TroopState::Removed {
            return false;
        }
        if self.state != TroopState::Dying {
            self.transition(TroopState::Dying);
        }
        if let Some(token) = self.token.take() {
            registry.unsubscribe(host, token);
        }
        self.mover.kill(host);
        self.prop.kill(host);
        discard(host, &self.extras);
        self.transition(TroopState::Removed);
        true
    }

    fn transition(&mut self, to: TroopState) {
        debug!(
            troop = %self.key,
            kind = %self.classification,
            from = ?self.state,
            ?to,
            "troop transition"
        );
        self.state = to;
    }

    // -- accessors ----------------------------------------------------------

    pub fn key(&self) -> TroopKey {
        self.key
    }

    pub fn id(&self) -> TroopId {
        self.key.id
    }

    pub fn faction(&self) -> Faction {
        self.key.faction
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Last observed health.
    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn state(&self) -> TroopState {
        self.state
    }

    /// `true` until the troop starts dying.
    pub fn is_alive(&self) -> bool {
        matches!(self.state, TroopState::Spawning | TroopState::Moving)
    }

    pub fn is_removed(&self) -> bool {
        self.state == TroopState::Removed
    }

    pub fn mover(&self) -> TrackTrain {
        self.mover
    }

    pub fn prop(&self) -> PhysicsProp {
        self.prop
    }

    /// The live health subscription, if any.
    pub fn subscription(&self) -> Option<SubscriptionToken> {
        self.token
    }
}

impl Debuggable for Troop {
    fn debug_column_title(&self) -> String {
        "Troop HP".to_owned()
    }

    fn debug_entity_name(&self) -> String {
        self.classification.label().to_owned()
    }

    fn debug_current_value(&self) -> String {
        format!("HP: {:.*}", self.health_precision, self.health)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find and check the mover and prop among freshly spawned handles.
fn resolve_pair<D: EntityDirectory + ?Sized>(
    directory: &D,
    template_name: &str,
    classification: Classification,
    spawned: &[ActorHandle],
) -> Result<(TrackTrain, PhysicsProp), TroopError> {
    let find = |prefix: &str| -> Result<ActorHandle, TroopError> {
        spawned
            .iter()
            .copied()
            .find(|&h| {
                directory
                    .entity_name(h)
                    .is_some_and(|name| name.starts_with(prefix))
            })
            .ok_or_else(|| TroopError::IncompleteSpawn {
                template: template_name.to_owned(),
                missing: prefix.to_owned(),
            })
    };

    let mover = find(&classification.mover_prefix())?;
    let prop = find(&classification.prop_prefix())?;
    Ok((cast(directory, mover)?, cast(directory, prop)?))
}

/// Kill every handle of an abandoned spawn.
fn discard<H: Host + ?Sized>(host: &mut H, spawned: &[ActorHandle]) {
    for &handle in spawned {
        host.fire_input(handle, KILL_INPUT, None);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use garrison_host::sim::{Blueprint, EntitySpec, TemplateSpec};

    fn troop_template(suffix: &str, contents: Vec<EntitySpec>) -> TemplateSpec {
        TemplateSpec {
            name: format!("{TEMPLATE_PREFIX}{suffix}"),
            contents,
        }
    }

    fn standard_contents(suffix: &str) -> Vec<EntitySpec> {
        vec![
            EntitySpec::new(&format!("train.{suffix}"), "func_tracktrain"),
            EntitySpec::new(&format!("mdl.{suffix}"), "prop_physics_multiplayer")
                .with_property(HEALTH_PROPERTY, 100.0),
        ]
    }

    fn setup(templates: Vec<TemplateSpec>) -> (SimHost, SubscriptionRegistry<TroopKey>, PathTrack) {
        let blueprint = Blueprint {
            entities: vec![EntitySpec::new("ct_path.a.1", "path_track")],
            templates,
        };
        let host = SimHost::from_blueprint(&blueprint);
        let start = cast(&host, host.find_by_name("ct_path.a.1").unwrap()).unwrap();
        (host, SubscriptionRegistry::new(), start)
    }

    fn template(host: &SimHost, name: &str) -> PointTemplate {
        cast(host, host.find_by_name(name).unwrap()).unwrap()
    }

    fn key(id: u64) -> TroopKey {
        TroopKey {
            faction: Faction::CounterTerrorist,
            id: TroopId(id),
        }
    }

    fn spawn_vase() -> (SimHost, SubscriptionRegistry<TroopKey>, Troop) {
        let (mut host, mut registry, start) =
            setup(vec![troop_template("vase", standard_contents("vase"))]);
        let vase = template(&host, "template.troop.vase");
        let troop = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            vase,
            start,
            TroopParams::default(),
        )
        .unwrap();
        (host, registry, troop)
    }

    // -- classification -------------------------------------------------------

    #[test]
    fn classification_from_template_name() {
        assert_eq!(
            Classification::from_template_name("template.troop.vase"),
            Ok(Classification::Vase)
        );
        assert_eq!(
            Classification::from_template_name("template.troop.FLOWER"),
            Ok(Classification::Flower)
        );
        assert!(Classification::from_template_name("template.troop.unknown").is_err());
        assert!(Classification::from_template_name("vase").is_err());
        assert!(Classification::from_template_name("template.troop.").is_err());
    }

    #[test]
    fn classification_names_are_consistent() {
        for kind in Classification::ALL {
            assert_eq!(
                Classification::from_template_name(&kind.template_name()),
                Ok(kind)
            );
            assert_eq!(kind.label().to_ascii_lowercase(), kind.suffix());
            assert_eq!(kind.suffix().parse::<Classification>(), Ok(kind));
        }
        assert_eq!(Classification::Gallon.mover_prefix(), "train.gallon");
        assert_eq!(Classification::Gallon.prop_prefix(), "mdl.gallon");
    }

    // -- construction ---------------------------------------------------------

    #[test]
    fn spawn_starts_moving_with_live_subscription() {
        let (host, registry, troop) = spawn_vase();

        assert_eq!(troop.state(), TroopState::Moving);
        assert_eq!(troop.classification(), Classification::Vase);
        assert_eq!(troop.health(), SPAWN_HEALTH);
        let token = troop.subscription().unwrap();
        let change = PropertyChange {
            token,
            target: troop.prop().handle(),
            property: HEALTH_PROPERTY.to_owned(),
            value: 1.0,
        };
        assert_eq!(registry.route(&change), Some(key(1)));

        let mover = troop.mover().handle();
        assert_eq!(host.path_node(mover), Some("ct_path.a.1"));
        assert_eq!(host.speed(mover), Some(DEFAULT_SPEED));
        assert!(host.is_moving(mover));
    }

    #[test]
    fn unknown_classification_spawns_nothing() {
        let (mut host, mut registry, start) =
            setup(vec![troop_template("unknown", standard_contents("unknown"))]);
        let unknown = template(&host, "template.troop.unknown");
        let before = host.entity_count();

        let err = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            unknown,
            start,
            TroopParams::default(),
        )
        .unwrap_err();

        assert!(matches!(err, TroopError::UnknownClassification(_)));
        assert_eq!(host.entity_count(), before);
        assert_eq!(host.stats().spawned, 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_prop_is_incomplete_and_cleans_up() {
        let (mut host, mut registry, start) = setup(vec![troop_template(
            "door",
            vec![EntitySpec::new("train.door", "func_tracktrain")],
        )]);
        let door = template(&host, "template.troop.door");
        let before = host.entity_count();

        let err = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            door,
            start,
            TroopParams::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            TroopError::IncompleteSpawn {
                template: "template.troop.door".to_owned(),
                missing: "mdl.door".to_owned(),
            }
        );
        assert_eq!(host.entity_count(), before);
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_template_is_incomplete() {
        let (mut host, mut registry, start) = setup(vec![troop_template("liter", Vec::new())]);
        let liter = template(&host, "template.troop.liter");

        let err = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            liter,
            start,
            TroopParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TroopError::IncompleteSpawn { ref missing, .. } if missing == "train.liter"
        ));
    }

    #[test]
    fn wrongly_classed_prop_fails_cast_and_cleans_up() {
        let (mut host, mut registry, start) = setup(vec![troop_template(
            "statue",
            vec![
                EntitySpec::new("train.statue", "func_tracktrain"),
                EntitySpec::new("mdl.statue", "prop_dynamic"),
            ],
        )]);
        let statue = template(&host, "template.troop.statue");
        let before = host.entity_count();

        let err = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            statue,
            start,
            TroopParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TroopError::Cast(CastError::ClassMismatch { .. })));
        assert_eq!(host.entity_count(), before);
    }

    #[test]
    fn dead_start_node_unwinds_subscription() {
        let (mut host, mut registry, start) =
            setup(vec![troop_template("vase", standard_contents("vase"))]);
        let vase = template(&host, "template.troop.vase");
        host.fire_input(start.handle(), "Kill", None);
        let before = host.entity_count();

        let err = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            vase,
            start,
            TroopParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TroopError::Cast(CastError::StaleHandle { .. })));
        assert!(registry.is_empty());
        assert_eq!(host.subscription_count(), 0);
        assert_eq!(host.entity_count(), before);
    }

    // -- health and teardown --------------------------------------------------

    #[test]
    fn health_updates_until_zero() {
        let (mut host, mut registry, mut troop) = spawn_vase();

        assert_eq!(
            troop.observe_health(&mut host, &mut registry, 52.5),
            HealthOutcome::Updated
        );
        assert_eq!(troop.health(), 52.5);
        assert!(troop.is_alive());

        assert_eq!(
            troop.observe_health(&mut host, &mut registry, 0.0),
            HealthOutcome::Died
        );
        assert!(troop.is_removed());
        assert_eq!(troop.subscription(), None);
        assert!(registry.is_empty());
        assert!(!host.is_valid(troop.mover().handle()));
        assert!(!host.is_valid(troop.prop().handle()));
    }

    #[test]
    fn health_may_rise_without_side_effects() {
        let (mut host, mut registry, mut troop) = spawn_vase();
        troop.observe_health(&mut host, &mut registry, 10.0);
        assert_eq!(
            troop.observe_health(&mut host, &mut registry, 250.0),
            HealthOutcome::Updated
        );
        assert_eq!(troop.health(), 250.0);
        assert_eq!(troop.state(), TroopState::Moving);
    }

    #[test]
    fn nan_health_is_stored_but_not_fatal() {
        let (mut host, mut registry, mut troop) = spawn_vase();
        assert_eq!(
            troop.observe_health(&mut host, &mut registry, f64::NAN),
            HealthOutcome::Updated
        );
        assert!(troop.is_alive());
    }

    #[test]
    fn health_after_removal_is_ignored() {
        let (mut host, mut registry, mut troop) = spawn_vase();
        troop.observe_health(&mut host, &mut registry, -5.0);
        assert_eq!(
            troop.observe_health(&mut host, &mut registry, 80.0),
            HealthOutcome::Ignored
        );
        assert_eq!(troop.health(), -5.0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let (mut host, mut registry, mut troop) = spawn_vase();

        assert!(troop.destroy(&mut host, &mut registry));
        let stats = host.stats();
        let inputs = host.fired_inputs().len();

        assert!(!troop.destroy(&mut host, &mut registry));
        assert_eq!(host.stats(), stats);
        assert_eq!(host.fired_inputs().len(), inputs);
        assert_eq!(stats.killed, 2);
        assert_eq!(stats.unsubscribed, 1);
    }

    #[test]
    fn debug_row_shows_label_and_fixed_precision_health() {
        let (mut host, mut registry, mut troop) = spawn_vase();
        assert_eq!(troop.debug_entity_name(), "VASE");
        assert_eq!(troop.debug_current_value(), "HP: 100.000");
        troop.observe_health(&mut host, &mut registry, 5.0);
        assert_eq!(troop.debug_current_value(), "HP: 5.000");
        assert_eq!(troop.debug_column_title(), "Troop HP");
    }

    #[test]
    fn destroy_kills_extra_template_entities() {
        let mut contents = standard_contents("door");
        contents.push(EntitySpec::new("particle.door", "info_particle_system"));
        let (mut host, mut registry, start) = setup(vec![troop_template("door", contents)]);
        let door = template(&host, "template.troop.door");
        let before = host.entity_count();

        let mut troop = Troop::spawn(
            &mut host,
            &mut registry,
            key(1),
            door,
            start,
            TroopParams::default(),
        )
        .unwrap();
        assert_eq!(host.entity_count(), before + 3);

        assert!(troop.destroy(&mut host, &mut registry));
        assert_eq!(host.entity_count(), before);
        assert_eq!(host.stats().killed, 3);
    }

    #[test]
    fn oversized_precision_is_capped() {
        let (mut host, mut registry, start) =
            setup(vec![troop_template("vase", standard_contents("vase"))]);
        let vase = template(&host, "template.troop.vase");
        let params = TroopParams {
            health_precision: 70_000,
            ..TroopParams::default()
        };
        let troop = Troop::spawn(&mut host, &mut registry, key(1), vase, start, params).unwrap();
        assert_eq!(troop.debug_current_value(), format!("HP: {:.16}", 100.0));
    }
}
