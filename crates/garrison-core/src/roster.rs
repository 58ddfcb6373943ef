//! Per-faction troop rosters.
//!
//! A [`FactionRoster`] owns the troops of one faction in spawn order. Removal
//! is two-phase: a troop that dies while health changes are being delivered
//! is only marked [`Removed`](crate::troop::TroopState::Removed); it stays in
//! the sequence, hidden from [`count`](FactionRoster::count) and from the
//! debug rows, until [`compact`](FactionRoster::compact) splices it out at
//! the start of the next think. Explicit removal through
//! [`remove`](FactionRoster::remove) is not re-entrant and splices at once.

use std::fmt;

use garrison_host::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::debug_menu::{DebugColumn, Debuggable};
use crate::subscription::SubscriptionRegistry;
use crate::troop::{HealthOutcome, Troop, TroopKey};

// ---------------------------------------------------------------------------
// Faction
// ---------------------------------------------------------------------------

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    CounterTerrorist,
    Terrorist,
}

impl Faction {
    /// Both factions, CT first.
    pub const ALL: [Faction; 2] = [Faction::CounterTerrorist, Faction::Terrorist];

    /// Display label, `"CT"` or `"T"`.
    pub fn label(self) -> &'static str {
        match self {
            Faction::CounterTerrorist => "CT",
            Faction::Terrorist => "T",
        }
    }

    /// Prefix used in map entity names, `"ct"` or `"t"`.
    pub fn prefix(self) -> &'static str {
        match self {
            Faction::CounterTerrorist => "ct",
            Faction::Terrorist => "t",
        }
    }

    /// Parse a faction name, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.prefix().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// FactionRoster
// ---------------------------------------------------------------------------

/// The troops of one faction, in spawn order.
#[derive(Debug)]
pub struct FactionRoster {
    faction: Faction,
    troops: Vec<Troop>,
}

impl FactionRoster {
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            troops: Vec::new(),
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Append a troop at the end of the display order.
    pub fn add(&mut self, troop: Troop) {
        debug!(faction = %self.faction, troop = %troop.key(), "troop added to roster");
        self.troops.push(troop);
    }

    /// Destroy and splice out the troop with `key`.
    ///
    /// Returns `false` if no such troop is in the roster. A troop that had
    /// already died is still spliced out, but nothing is torn down twice.
    pub fn remove<H: Host + ?Sized>(
        &mut self,
        key: TroopKey,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
    ) -> bool {
        let Some(index) = self.troops.iter().position(|t| t.key() == key) else {
            return false;
        };
        let mut troop = self.troops.remove(index);
        troop.destroy(host, registry);
        debug!(faction = %self.faction, troop = %key, "troop removed from roster");
        true
    }

    /// Destroy every live troop. They are spliced out by the next
    /// [`compact`](Self::compact). Returns how many were destroyed.
    pub fn destroy_all<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
    ) -> usize {
        let mut destroyed = 0;
        for troop in &mut self.troops {
            if troop.destroy(host, registry) {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Deliver a health value to the troop with `key`.
    pub fn observe_health<H: Host + ?Sized>(
        &mut self,
        key: TroopKey,
        value: f64,
        host: &mut H,
        registry: &mut SubscriptionRegistry<TroopKey>,
    ) -> Option<HealthOutcome> {
        let troop = self.troops.iter_mut().find(|t| t.key() == key)?;
        Some(troop.observe_health(host, registry, value))
    }

    /// Splice out every removed troop. Returns how many were dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.troops.len();
        self.troops.retain(|t| !t.is_removed());
        let dropped = before - self.troops.len();
        if dropped > 0 {
            debug!(faction = %self.faction, dropped, "roster compacted");
        }
        dropped
    }

    /// Number of troops that have not been removed.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Removed troops still waiting for [`compact`](Self::compact).
    pub fn pending_removal(&self) -> usize {
        self.troops.len() - self.count()
    }

    pub fn get(&self, key: TroopKey) -> Option<&Troop> {
        self.troops.iter().find(|t| t.key() == key)
    }

    pub fn contains(&self, key: TroopKey) -> bool {
        self.iter().any(|t| t.key() == key)
    }

    /// Troops that have not been removed, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Troop> {
        self.troops.iter().filter(|t| !t.is_removed())
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

impl DebugColumn for FactionRoster {
    fn column_title(&self) -> String {
        self.faction.label().to_owned()
    }

    fn cells(&self) -> Vec<String> {
        self.iter().map(Debuggable::debug_cell).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
