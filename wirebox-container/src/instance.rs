//! Resolved instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::DependencyKey;

/// A constructed object, type-erased and tagged with the producer that built it.
///
/// Singletons hand out clones of the same `Instance`; use
/// [`Instance::same_as`] to compare identity.
#[derive(Clone)]
pub struct Instance {
    producer: DependencyKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wraps an already constructed value.
    pub fn new(producer: DependencyKey, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { producer, value }
    }

    /// Wraps the results of a resolve-all request.
    pub(crate) fn collection(key: DependencyKey, items: Vec<Instance>) -> Self {
        Self::new(key, Arc::new(items))
    }

    /// Key of the concrete producer (for collections: the `All<_>` key).
    pub fn producer(&self) -> &DependencyKey {
        &self.producer
    }

    /// Borrows the value as `T`, if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Shares the value as `Arc<T>`, if that is its concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Items of a resolve-all result, in registration order.
    pub fn items(&self) -> Option<&[Instance]> {
        self.downcast_ref::<Vec<Instance>>().map(Vec::as_slice)
    }

    /// Returns `true` if both handles point at the same object.
    pub fn same_as(&self, other: &Instance) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("producer", &self.producer)
            .field("addr", &Arc::as_ptr(&self.value).cast::<()>())
            .finish()
    }
}
