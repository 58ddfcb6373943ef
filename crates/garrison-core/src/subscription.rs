//! Bookkeeping for property change subscriptions.
//!
//! The [`SubscriptionRegistry`] sits between game objects and the host's
//! [`ChangeFeed`]. It records, for every live host token, which entity and
//! property it watches and which listener should receive its changes. The
//! listener is a small `Copy` key (for troops, a [`TroopKey`]) rather than a
//! stored closure: delivery looks the key up and hands the change to the
//! owner of that key, which is then free to cancel its own subscription
//! without the registry being mid-iteration.
//!
//! # Guarantees
//!
//! - At most one live registration per (entity, property) pair.
//! - Each host token is registered at most once.
//! - [`unsubscribe`](SubscriptionRegistry::unsubscribe) of an unknown or
//!   already-cancelled token is a no-op that returns `false`.
//! - [`route`](SubscriptionRegistry::route) never returns a listener for a
//!   token that has been cancelled, so a change that was already queued when
//!   its subscription was cancelled is dropped.
//!
//! [`TroopKey`]: crate::troop::TroopKey

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use garrison_host::prelude::*;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// SubscriptionError
// ---------------------------------------------------------------------------

/// Why a subscription could not be registered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubscriptionError {
    /// The pair already has a live registration.
    #[error("{target} already has a live '{property}' subscription ({existing})")]
    AlreadySubscribed {
        target: ActorHandle,
        property: String,
        existing: SubscriptionToken,
    },

    /// The host refused the registration.
    #[error("host rejected subscription: {0}")]
    Rejected(#[from] HostError),
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// One live subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration<K> {
    pub target: ActorHandle,
    pub property: String,
    pub listener: K,
}

// ---------------------------------------------------------------------------
// SubscriptionRegistry
// ---------------------------------------------------------------------------

/// Maps host subscription tokens to listeners.
#[derive(Debug)]
pub struct SubscriptionRegistry<K> {
    entries: BTreeMap<SubscriptionToken, Registration<K>>,
    by_target: HashMap<(ActorHandle, String), SubscriptionToken>,
}

impl<K: Copy + fmt::Debug> SubscriptionRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_target: HashMap::new(),
        }
    }

    /// Subscribe `listener` to changes of `property` on `target`.
    ///
    /// The host is only asked once the pair is known to be free, so a
    /// rejected duplicate never leaves a dangling host-side subscription.
    pub fn subscribe<H: ChangeFeed + ?Sized>(
        &mut self,
        host: &mut H,
        target: ActorHandle,
        property: &str,
        listener: K,
    ) -> Result<SubscriptionToken, SubscriptionError> {
        let key = (target, property.to_owned());
        if let Some(&existing) = self.by_target.get(&key) {
            return Err(SubscriptionError::AlreadySubscribed {
                target,
                property: key.1,
                existing,
            });
        }

        let token = host.subscribe(target, property)?;
        debug!(%token, %target, property, ?listener, "subscription registered");
        self.by_target.insert(key, token);
        self.entries.insert(
            token,
            Registration {
                target,
                property: property.to_owned(),
                listener,
            },
        );
        Ok(token)
    }

    /// Cancel a subscription.
    ///
    /// Returns `true` if the token was live here. Unknown tokens are ignored
    /// and the host is not contacted for them.
    pub fn unsubscribe<H: ChangeFeed + ?Sized>(
        &mut self,
        host: &mut H,
        token: SubscriptionToken,
    ) -> bool {
        let Some(registration) = self.entries.remove(&token) else {
            trace!(%token, "unsubscribe of inactive token ignored");
            return false;
        };
        self.by_target
            .remove(&(registration.target, registration.property.clone()));
        // The host may already have dropped it (entity killed out-of-band).
        let host_had_it = host.unsubscribe(token);
        debug!(
            %token,
            target = %registration.target,
            property = %registration.property,
            host_had_it,
            "subscription cancelled"
        );
        true
    }

    /// The listener a change should be delivered to, if its subscription is
    /// still live and the change matches what was subscribed.
    pub fn route(&self, change: &PropertyChange) -> Option<K> {
        self.entries
            .get(&change.token)
            .filter(|r| r.target == change.target && r.property == change.property)
            .map(|r| r.listener)
    }

    /// The live token watching `property` on `target`.
    pub fn token_for(&self, target: ActorHandle, property: &str) -> Option<SubscriptionToken> {
        self.by_target.get(&(target, property.to_owned())).copied()
    }

    /// The registration behind a token.
    pub fn registration(&self, token: SubscriptionToken) -> Option<&Registration<K>> {
        self.entries.get(&token)
    }

    /// Whether the token is live.
    pub fn contains(&self, token: SubscriptionToken) -> bool {
        self.entries.contains_key(&token)
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Copy + fmt::Debug> Default for SubscriptionRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn host_with_prop() -> (SimHost, ActorHandle) {
        let mut host = SimHost::new();
        let prop = host.add_entity(
            EntitySpec::new("mdl.vase", "prop_physics_multiplayer").with_property("health", 100.0),
        );
        (host, prop)
    }

    #[test]
    fn subscribe_then_route_changes_to_listener() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        let token = registry.subscribe(&mut host, prop, "health", 7u32).unwrap();

        host.apply_damage(prop, 25.0).unwrap();
        let changes = host.drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(registry.route(&changes[0]), Some(7));
        assert_eq!(registry.token_for(prop, "health"), Some(token));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_subscription_for_same_pair_is_rejected() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        let first = registry.subscribe(&mut host, prop, "health", 1u32).unwrap();

        let err = registry
            .subscribe(&mut host, prop, "health", 2u32)
            .unwrap_err();
        assert_eq!(
            err,
            SubscriptionError::AlreadySubscribed {
                target: prop,
                property: "health".to_owned(),
                existing: first,
            }
        );
        // The host never saw the duplicate.
        assert_eq!(host.subscription_count(), 1);
        assert_eq!(registry.registration(first).unwrap().listener, 1);
    }

    #[test]
    fn different_properties_on_one_entity_are_independent() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(&mut host, prop, "health", 1u32).unwrap();
        registry.subscribe(&mut host, prop, "armor", 2u32).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        let token = registry.subscribe(&mut host, prop, "health", 1u32).unwrap();

        assert!(registry.unsubscribe(&mut host, token));
        assert!(!registry.unsubscribe(&mut host, token));
        assert!(registry.is_empty());
        assert_eq!(host.stats().unsubscribed, 1);
        // The pair is free again.
        assert!(registry.subscribe(&mut host, prop, "health", 3u32).is_ok());
    }

    #[test]
    fn queued_change_is_dropped_after_unsubscribe() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        let token = registry.subscribe(&mut host, prop, "health", 1u32).unwrap();

        host.apply_damage(prop, 100.0).unwrap();
        registry.unsubscribe(&mut host, token);

        let changes = host.drain_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(registry.route(&changes[0]), None);
    }

    #[test]
    fn host_rejection_is_reported_and_nothing_registered() {
        let (mut host, prop) = host_with_prop();
        host.fire_input(prop, "Kill", None);
        let mut registry = SubscriptionRegistry::new();

        let err = registry
            .subscribe(&mut host, prop, "health", 1u32)
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Rejected(HostError::StaleHandle { .. })));
        assert!(registry.is_empty());
        assert_eq!(registry.token_for(prop, "health"), None);
    }

    #[test]
    fn unsubscribe_after_host_dropped_token_still_clears_registry() {
        let (mut host, prop) = host_with_prop();
        let mut registry = SubscriptionRegistry::new();
        let token = registry.subscribe(&mut host, prop, "health", 1u32).unwrap();

        // Entity killed behind our back; the host forgets the token.
        host.fire_input(prop, "Kill", None);

        assert!(registry.unsubscribe(&mut host, token));
        assert!(registry.is_empty());
    }

    #[test]
    fn route_ignores_mismatched_target() {
        let (mut host, prop) = host_with_prop();
        let other = host.add_entity(EntitySpec::new("mdl.door", "prop_physics_multiplayer"));
        let mut registry = SubscriptionRegistry::new();
        let token = registry.subscribe(&mut host, prop, "health", 1u32).unwrap();

        let forged = PropertyChange {
            token,
            target: other,
            property: "health".to_owned(),
            value: 0.0,
        };
        assert_eq!(registry.route(&forged), None);
    }
}
