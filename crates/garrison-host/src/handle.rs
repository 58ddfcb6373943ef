//! Actor handles and the slot table that backs them.
//!
//! An [`ActorHandle`] names one engine entity by slot and generation. The
//! [`EntitySlots`] table stores entity state inline in its slots; removing
//! an entity bumps the slot's generation, so any handle still pointing at
//! the old occupant stops resolving even after the slot is refilled.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A generational reference to an engine-owned entity.
///
/// Handles are `Copy` and do not own the entity. Two handles compare equal
/// exactly when they name the same engine object; ordering follows slot
/// order, which is also the host's lookup order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorHandle {
    slot: u32,
    generation: u32,
}

impl ActorHandle {
    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorHandle(#{}@{})", self.slot, self.generation)
    }
}

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.slot, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    occupant: Option<T>,
}

/// Entity state keyed by [`ActorHandle`].
///
/// Vacated slots are refilled most-recent-first. Iteration is in slot order.
#[derive(Debug, Clone)]
pub struct EntitySlots<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
    len: usize,
}

impl<T> Default for EntitySlots<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            len: 0,
        }
    }
}

impl<T> EntitySlots<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` in a free slot and return its handle.
    pub fn insert(&mut self, value: T) -> ActorHandle {
        self.len += 1;
        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.occupant = Some(value);
            return ActorHandle {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            occupant: Some(value),
        });
        ActorHandle {
            slot,
            generation: 0,
        }
    }

    /// Take the entity out of its slot. Stale handles return `None`.
    pub fn remove(&mut self, handle: ActorHandle) -> Option<T> {
        let entry = self.slots.get_mut(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let value = entry.occupant.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(handle.slot);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&T> {
        self.slots
            .get(handle.slot as usize)
            .filter(|e| e.generation == handle.generation)
            .and_then(|e| e.occupant.as_ref())
    }

    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|e| e.generation == handle.generation)
            .and_then(|e| e.occupant.as_mut())
    }

    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Occupied slots with their handles, lowest slot first.
    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(slot, e)| {
            e.occupant.as_ref().map(|value| {
                (
                    ActorHandle {
                        slot: slot as u32,
                        generation: e.generation,
                    },
                    value,
                )
            })
        })
    }
}
