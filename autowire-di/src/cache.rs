//! Instance caches hold component instances reused by providers - singletons in the root provider
//! and scoped instances in scope providers. Entries are keyed by [Binding] and remember the order
//! in which they were created, so disposal can release dependents before their dependencies.
//!
//! Note: lifetimes are checked when a component is constructed, not when it's used, so mixing them
//! can have surprising results. A singleton depending on a transient component gets a fresh
//! instance of the dependency once, which then lives as long as the singleton.

use crate::binding::{Binding, DisposeFunction};
use crate::instance_provider::{ComponentInstanceAnyPtr, ServiceKey};
use fxhash::FxHashMap;
use std::any::TypeId;
use tracing::{debug, error};

struct CachedInstance {
    key: ServiceKey,
    instance: ComponentInstanceAnyPtr,
    dispose: Option<DisposeFunction>,
}

/// Cache of instances created for bindings, in creation order.
#[derive(Default)]
pub struct InstanceCache {
    entries: Vec<CachedInstance>,
    index: FxHashMap<TypeId, usize>,
}

impl InstanceCache {
    /// Gets the instance created for given binding, if present.
    #[inline]
    pub fn instance(&self, binding: &Binding) -> Option<ComponentInstanceAnyPtr> {
        self.index
            .get(&binding.abstraction_type.type_id)
            .and_then(|index| self.entries.get(*index))
            .map(|entry| entry.instance.clone())
    }

    /// Stores given instance for the binding. An instance already stored for the same binding is
    /// kept; the cache never replaces entries.
    pub fn store_instance(&mut self, binding: &Binding, instance: ComponentInstanceAnyPtr) {
        if self
            .index
            .contains_key(&binding.abstraction_type.type_id)
        {
            return;
        }

        self.index
            .insert(binding.abstraction_type.type_id, self.entries.len());
        self.entries.push(CachedInstance {
            key: binding.abstraction_type,
            instance,
            dispose: binding.dispose,
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Disposes cached disposable instances, newest first, and empties the cache. Failures are
    /// logged and don't stop disposal of the remaining instances.
    pub fn dispose_all(&mut self) {
        self.index.clear();

        for entry in self.entries.drain(..).rev() {
            let Some(dispose) = entry.dispose else {
                continue;
            };

            debug!(service = entry.key.type_name, "Disposing instance");

            if let Err(error) = dispose(&entry.instance) {
                error!(service = entry.key.type_name, %error, "Error disposing instance");
            }
        }
    }
}
