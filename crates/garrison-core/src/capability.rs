//! Typed views over opaque engine handles.
//!
//! The engine hands back bare [`ActorHandle`]s. A *capability* is a `Copy`
//! wrapper around one handle that exposes the behavior of a specific engine
//! class (a track train can be started, a template can be spawned). The only
//! way to obtain one is [`cast`], which checks the class the host reports for
//! the handle first. Identity is preserved: the wrapper holds the very same
//! handle, so every call reaches the same engine object.
//!
//! ```
//! use garrison_core::capability::{cast, Capability, PathTrack, TrackTrain};
//! use garrison_host::prelude::*;
//!
//! let mut host = SimHost::new();
//! let node = host.add_entity(EntitySpec::new("ct_path.a.1", "path_track"));
//!
//! let path: PathTrack = cast(&host, node).unwrap();
//! assert_eq!(path.handle(), node);
//! assert!(cast::<TrackTrain, _>(&host, node).is_err());
//! ```

use std::fmt;

use garrison_host::prelude::*;

// ---------------------------------------------------------------------------
// CastError
// ---------------------------------------------------------------------------

/// Why a handle could not be viewed as a capability.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CastError {
    /// The handle no longer names a live entity.
    #[error("cannot cast {handle}: entity is gone")]
    StaleHandle { handle: ActorHandle },

    /// The entity is of a different engine class.
    #[error("cannot cast {handle} to {expected}: entity is a {found}")]
    ClassMismatch {
        handle: ActorHandle,
        expected: &'static str,
        found: String,
    },
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

mod sealed {
    use garrison_host::ActorHandle;

    pub trait Verified {
        fn from_verified(handle: ActorHandle) -> Self;
    }
}

/// A handle whose engine class has been verified.
pub trait Capability: sealed::Verified + Copy + fmt::Debug {
    /// Engine class this capability requires.
    const CLASS_NAME: &'static str;

    /// The underlying handle.
    fn handle(&self) -> ActorHandle;

    /// Whether the entity is still alive.
    fn is_alive<D: EntityDirectory + ?Sized>(&self, directory: &D) -> bool {
        directory.is_valid(self.handle())
    }

    /// The entity's current targetname.
    fn name<'a, D: EntityDirectory + ?Sized>(&self, directory: &'a D) -> Option<&'a str> {
        directory.entity_name(self.handle())
    }
}

/// View `handle` as capability `T`, after checking its engine class.
pub fn cast<T, D>(directory: &D, handle: ActorHandle) -> Result<T, CastError>
where
    T: Capability,
    D: EntityDirectory + ?Sized,
{
    match directory.class_name(handle) {
        None => Err(CastError::StaleHandle { handle }),
        Some(class) if class == T::CLASS_NAME => Ok(T::from_verified(handle)),
        Some(class) => Err(CastError::ClassMismatch {
            handle,
            expected: T::CLASS_NAME,
            found: class.to_owned(),
        }),
    }
}

macro_rules! capability {
    ($(#[$meta:meta])* $name:ident => $class:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(ActorHandle);

        impl sealed::Verified for $name {
            fn from_verified(handle: ActorHandle) -> Self {
                Self(handle)
            }
        }

        impl Capability for $name {
            const CLASS_NAME: &'static str = $class;

            fn handle(&self) -> ActorHandle {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

capability!(
    /// A `func_tracktrain`: the mover that carries a troop along a path.
    TrackTrain => "func_tracktrain"
);

capability!(
    /// A `prop_physics_multiplayer`: the damageable body of a troop.
    PhysicsProp => "prop_physics_multiplayer"
);

capability!(
    /// A `path_track` waypoint.
    PathTrack => "path_track"
);

capability!(
    /// A `point_template` that instantiates troop entities.
    PointTemplate => "point_template"
);

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Input that removes an entity from the world.
pub const KILL_INPUT: &str = "Kill";

impl TrackTrain {
    /// Teleport the train onto `node` and start it forward at `speed`.
    ///
    /// Fails only if the node has died, since its name is what the engine
    /// input refers to.
    pub fn teleport_to_path_and_start<H: Host + ?Sized>(
        &self,
        host: &mut H,
        node: PathTrack,
        speed: f64,
    ) -> Result<(), CastError> {
        let node_name = node
            .name(&*host)
            .ok_or(CastError::StaleHandle {
                handle: node.handle(),
            })?
            .to_owned();
        host.fire_input(
            self.0,
            "TeleportToPathNode",
            Some(InputValue::Text(node_name)),
        );
        self.set_speed(host, speed);
        host.fire_input(self.0, "StartForward", None);
        Ok(())
    }

    /// Set the train's speed in engine units per second.
    pub fn set_speed<H: InputChannel + ?Sized>(&self, host: &mut H, speed: f64) {
        host.fire_input(self.0, "SetSpeedReal", Some(InputValue::Number(speed)));
    }

    pub fn kill<H: InputChannel + ?Sized>(&self, host: &mut H) {
        host.fire_input(self.0, KILL_INPUT, None);
    }
}

impl PhysicsProp {
    pub fn kill<H: InputChannel + ?Sized>(&self, host: &mut H) {
        host.fire_input(self.0, KILL_INPUT, None);
    }
}

impl PointTemplate {
    /// Instantiate the template's entities.
    pub fn force_spawn<H: TemplateSpawner + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<Vec<ActorHandle>, HostError> {
        host.force_spawn(self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_train() -> (SimHost, ActorHandle, ActorHandle) {
        let mut host = SimHost::new();
        let train = host.add_entity(EntitySpec::new("train.door", "func_tracktrain"));
        let node = host.add_entity(EntitySpec::new("ct_path.a.1", "path_track"));
        (host, train, node)
    }

    #[test]
    fn cast_preserves_identity() {
        let (host, train, _) = host_with_train();
        let typed: TrackTrain = cast(&host, train).unwrap();
        assert_eq!(typed.handle(), train);
        assert_eq!(typed.name(&host), Some("train.door"));
        assert!(typed.is_alive(&host));
    }

    #[test]
    fn cast_rejects_wrong_class() {
        let (host, train, _) = host_with_train();
        let err = cast::<PhysicsProp, _>(&host, train).unwrap_err();
        assert_eq!(
            err,
            CastError::ClassMismatch {
                handle: train,
                expected: "prop_physics_multiplayer",
                found: "func_tracktrain".to_owned(),
            }
        );
    }

    #[test]
    fn cast_rejects_stale_handle() {
        let (mut host, train, _) = host_with_train();
        host.fire_input(train, "Kill", None);
        assert_eq!(
            cast::<TrackTrain, _>(&host, train),
            Err(CastError::StaleHandle { handle: train })
        );
    }

    #[test]
    fn teleport_fires_inputs_in_engine_order() {
        let (mut host, train, node) = host_with_train();
        let typed: TrackTrain = cast(&host, train).unwrap();
        let path: PathTrack = cast(&host, node).unwrap();

        typed
            .teleport_to_path_and_start(&mut host, path, 500.0)
            .unwrap();

        let inputs: Vec<&str> = host
            .inputs_for(train)
            .iter()
            .map(|i| i.input.as_str())
            .collect();
        assert_eq!(inputs, ["TeleportToPathNode", "SetSpeedReal", "StartForward"]);
        assert_eq!(host.path_node(train), Some("ct_path.a.1"));
        assert_eq!(host.speed(train), Some(500.0));
        assert!(host.is_moving(train));
    }

    #[test]
    fn teleport_to_dead_node_fails_without_moving() {
        let (mut host, train, node) = host_with_train();
        let typed: TrackTrain = cast(&host, train).unwrap();
        let path: PathTrack = cast(&host, node).unwrap();
        host.fire_input(node, "Kill", None);

        let result = typed.teleport_to_path_and_start(&mut host, path, 500.0);
        assert_eq!(result, Err(CastError::StaleHandle { handle: node }));
        assert!(host.inputs_for(train).is_empty());
    }

    #[test]
    fn debug_format_names_the_capability() {
        let (host, train, _) = host_with_train();
        let typed: TrackTrain = cast(&host, train).unwrap();
        assert_eq!(format!("{typed:?}"), format!("TrackTrain({train})"));
    }
}
