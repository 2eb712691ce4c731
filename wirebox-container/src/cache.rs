//! Lifetime cache for singleton instances.
//!
//! One slot per singleton registration. A slot is inserted into the map
//! atomically (insert-if-absent) and then initialized through a
//! [`OnceCell`], so concurrent first-time resolutions of the same slot run
//! the constructor exactly once and all observe the same instance.
//!
//! A failed construction leaves the slot empty; the next resolution retries.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::Result;
use crate::instance::Instance;
use crate::key::DependencyKey;

/// Identifies a singleton slot: the `(contract, producer)` pair of its
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey {
    pub contract: DependencyKey,
    pub producer: DependencyKey,
}

#[derive(Debug, Default)]
pub(crate) struct LifetimeCache {
    slots: DashMap<SlotKey, Arc<OnceCell<Instance>>>,
}

impl LifetimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached instance for `slot`, constructing it with
    /// `factory` on first use.
    ///
    /// The map guard is released before `factory` runs, so factories may
    /// resolve other singletons.
    pub fn get_or_create<F>(&self, slot: SlotKey, factory: F) -> Result<Instance>
    where
        F: FnOnce() -> Result<Instance>,
    {
        let cached = self.slots.get(&slot).and_then(|cell| cell.value().get().cloned());
        if let Some(instance) = cached {
            trace!(contract = %slot.contract, "Singleton cache hit");
            return Ok(instance);
        }

        let cell = Arc::clone(self.slots.entry(slot.clone()).or_default().value());

        cell.get_or_try_init(|| -> Result<Instance> {
            let instance = factory()?;
            debug!(contract = %slot.contract, producer = %slot.producer, "Singleton created");
            Ok(instance)
        })
        .cloned()
    }

    /// Number of initialized singletons.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|entry| entry.value().get().is_some()).count()
    }
}
