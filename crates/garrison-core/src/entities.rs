//! Well-known map entities, resolved once at match start.
//!
//! A map must provide one point template per [`Classification`] and, for
//! each faction and configured lane, a numbered run of path nodes:
//!
//! ```text
//! template.troop.door ... template.troop.flower
//! ct_path.a.1 ... ct_path.a.48    t_path.a.1 ... t_path.a.48
//! ct_path.b.1 ...                 t_path.b.1 ...
//! ```
//!
//! Anything missing or of the wrong class stops the match from starting.

use std::collections::BTreeMap;

use garrison_host::prelude::*;
use tracing::{error, info};

use crate::capability::{
    cast, CastError, Capability, PathTrack, PhysicsProp, PointTemplate, TrackTrain,
};
use crate::config::{ConfigurationError, MatchConfig};
use crate::roster::Faction;
use crate::troop::{Classification, HEALTH_PROPERTY};

/// Name of path node `index` (1-based) on a lane.
pub fn path_node_name(faction: Faction, lane: &str, index: u32) -> String {
    format!("{}_path.{lane}.{index}", faction.prefix())
}

/// Resolved templates and path nodes.
#[derive(Debug, Clone)]
pub struct GameEntities {
    templates: BTreeMap<Classification, PointTemplate>,
    lanes: BTreeMap<(Faction, String), Vec<PathTrack>>,
}

impl GameEntities {
    /// Look up and check every entity the match needs.
    pub fn resolve<D: EntityDirectory + ?Sized>(
        directory: &D,
        config: &MatchConfig,
    ) -> Result<Self, ConfigurationError> {
        let mut templates: BTreeMap<Classification, PointTemplate> = BTreeMap::new();
        for kind in Classification::ALL {
            templates.insert(kind, require(directory, &kind.template_name())?);
        }

        let mut lanes = BTreeMap::new();
        for faction in Faction::ALL {
            for lane in &config.lanes {
                let nodes = (1..=config.nodes_per_lane)
                    .map(|n| require(directory, &path_node_name(faction, lane, n)))
                    .collect::<Result<Vec<PathTrack>, _>>()?;
                lanes.insert((faction, lane.clone()), nodes);
            }
        }

        info!(
            templates = templates.len(),
            lanes = lanes.len(),
            nodes_per_lane = config.nodes_per_lane,
            "map entities resolved"
        );
        Ok(Self { templates, lanes })
    }

    /// The template that spawns `kind`.
    pub fn template(&self, kind: Classification) -> Option<PointTemplate> {
        self.templates.get(&kind).copied()
    }

    /// Every node of a lane, in path order.
    pub fn lane(&self, faction: Faction, lane: &str) -> Option<&[PathTrack]> {
        self.lanes
            .get(&(faction, lane.to_owned()))
            .map(Vec::as_slice)
    }

    /// The first node of a lane, where troops enter.
    pub fn lane_start(&self, faction: Faction, lane: &str) -> Option<PathTrack> {
        self.lane(faction, lane).and_then(|nodes| nodes.first().copied())
    }

    /// A map containing exactly what [`resolve`](Self::resolve) expects.
    pub fn blueprint(config: &MatchConfig) -> Blueprint {
        let mut entities = Vec::new();
        for faction in Faction::ALL {
            for lane in &config.lanes {
                for n in 1..=config.nodes_per_lane {
                    entities.push(EntitySpec::new(
                        &path_node_name(faction, lane, n),
                        PathTrack::CLASS_NAME,
                    ));
                }
            }
        }

        let templates = Classification::ALL
            .into_iter()
            .map(|kind| TemplateSpec {
                name: kind.template_name(),
                contents: vec![
                    EntitySpec::new(&kind.mover_prefix(), TrackTrain::CLASS_NAME),
                    EntitySpec::new(&kind.prop_prefix(), PhysicsProp::CLASS_NAME)
                        .with_property(HEALTH_PROPERTY, config.spawn_health),
                ],
            })
            .collect();

        Blueprint {
            entities,
            templates,
        }
    }
}

fn require<T: Capability, D: EntityDirectory + ?Sized>(
    directory: &D,
    name: &str,
) -> Result<T, ConfigurationError> {
    let result = directory
        .find_by_name(name)
        .ok_or_else(|| ConfigurationError::MissingEntity {
            name: name.to_owned(),
        })
        .and_then(|handle| {
            cast::<T, D>(directory, handle).map_err(|e| match e {
                CastError::ClassMismatch {
                    expected, found, ..
                } => ConfigurationError::WrongClass {
                    name: name.to_owned(),
                    expected,
                    found,
                },
                CastError::StaleHandle { .. } => ConfigurationError::MissingEntity {
                    name: name.to_owned(),
                },
            })
        });
    if let Err(e) = &result {
        error!(error = %e, "map entity resolution failed");
    }
    result
}
