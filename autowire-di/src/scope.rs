//! Scopes are short-lived child providers, e.g. one per request or unit of work. Each scope owns
//! its own cache of [Lifetime::Scoped] instances, while singletons and transients are delegated
//! to the root provider.
//!
//! Note: since delegated instances are constructed by the root, they cannot depend on scoped
//! components. Constructors needing a scoped component are never selected for them, and without
//! another satisfiable constructor resolution fails with
//! [NoSuitableConstructor](ComponentInstanceProviderError::NoSuitableConstructor), the same way it
//! would fail when resolved from the root directly.

use crate::binding::Lifetime;
use crate::binding_registry::BindingRegistry;
use crate::cache::InstanceCache;
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{
    CastFunction, ComponentInstanceAnyPtr, ComponentInstanceProvider, ServiceKey,
};
use crate::provider::{create_instance, RootProvider, ServiceProvider};
use fxhash::FxHashSet;
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use tracing::{debug, trace};

/// Child provider caching scoped instances. Borrows its root, so it can never outlive it.
pub struct ScopeProvider<'a> {
    root: &'a RootProvider,
    scoped: BindingRegistry,
    instances: RefCell<InstanceCache>,
    types_under_construction: RefCell<FxHashSet<TypeId>>,
    disposed: Cell<bool>,
}

impl<'a> ScopeProvider<'a> {
    pub fn new(root: &'a RootProvider) -> Self {
        let scoped = root.registry().scoped_bindings();
        debug!(scoped_bindings = scoped.len(), "Creating scope");

        Self {
            root,
            scoped,
            instances: Default::default(),
            types_under_construction: Default::default(),
            disposed: Cell::new(false),
        }
    }

    #[inline]
    pub fn root(&self) -> &'a RootProvider {
        self.root
    }

    /// Checks if either this scope or its root has been disposed.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get() || self.root.is_disposed()
    }
}

impl ComponentInstanceProvider for ScopeProvider<'_> {
    fn instance(
        &self,
        key: ServiceKey,
    ) -> Result<(ComponentInstanceAnyPtr, CastFunction), ComponentInstanceProviderError> {
        if self.is_disposed() {
            return Err(ComponentInstanceProviderError::ProviderDisposed);
        }

        let Some(binding) = self.scoped.lookup(key.type_id) else {
            return self.root.instance(key);
        };

        debug_assert_eq!(binding.lifetime, Lifetime::Scoped);

        if let Some(instance) = self.instances.borrow().instance(binding) {
            trace!(service = key.type_name, "Reusing scoped instance");
            return Ok((instance, binding.cast));
        }

        let instance = create_instance(binding, self, &self.types_under_construction)?;
        self.instances
            .borrow_mut()
            .store_instance(binding, instance.clone());

        Ok((instance, binding.cast))
    }

    #[inline]
    fn is_registered(&self, type_id: TypeId) -> bool {
        self.scoped.is_registered(type_id) || self.root.is_registered(type_id)
    }
}

impl ServiceProvider for ScopeProvider<'_> {
    fn create_scope(&self) -> ScopeProvider<'_> {
        self.root.create_scope()
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        debug!(
            instances = self.instances.borrow().len(),
            "Disposing scope"
        );

        self.instances.borrow_mut().dispose_all();
    }
}

impl Drop for ScopeProvider<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}
