//! Core functionality for resolving [Component](crate::component::Component) instances.
//!
//! The [RootProvider] owns all registered [Bindings](Binding) and the singleton cache. Scoped
//! instances can only be resolved through a [ScopeProvider] created from the root.
//!
//! ```
//! use autowire_di::binding::Lifetime;
//! use autowire_di::instance_provider::{ComponentInstancePtr, TypedComponentInstanceProvider};
//! use autowire_di::provider::{ProviderBuilder, ServiceProvider};
//! use autowire_di::Component;
//!
//! #[derive(Component)]
//! struct Settings {
//!     #[component(default)]
//!     verbose: bool,
//! }
//!
//! #[derive(Component)]
//! struct Session {
//!     settings: ComponentInstancePtr<Settings>,
//! }
//!
//! let provider = ProviderBuilder::new()
//!     .with_singleton::<Settings, Settings>()
//!     .with_scoped::<Session, Session>()
//!     .build();
//!
//! let scope = provider.create_scope();
//! let session = scope.resolve::<Session>().unwrap();
//! assert!(!session.settings.verbose);
//! assert!(provider.resolve::<Session>().is_err());
//! ```

use crate::binding::{Binding, Lifetime};
use crate::binding_registry::BindingRegistry;
use crate::cache::InstanceCache;
use crate::component::{Component, ComponentDowncast, Disposable, Injectable};
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{
    CastFunction, ComponentInstanceAnyPtr, ComponentInstanceProvider, ServiceKey,
};
use crate::resolver::construct;
use crate::scope::ScopeProvider;
use fxhash::FxHashSet;
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use tracing::{debug, trace};

/// Capabilities shared by the root provider and scopes, beside resolution.
pub trait ServiceProvider: ComponentInstanceProvider {
    /// Creates a new scope with its own cache of [Lifetime::Scoped] instances. Scopes created from
    /// other scopes are siblings - they all share the same root.
    fn create_scope(&self) -> ScopeProvider<'_>;

    /// Releases cached instances owned by this provider. Disposal errors are logged, but
    /// otherwise ignored. Calling this more than once has no effect.
    fn dispose(&self);
}

/// Builder for [RootProvider], for easy registration of bindings.
#[derive(Default, Debug)]
pub struct ProviderBuilder {
    registry: BindingRegistry,
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prepared binding.
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.registry.register(binding);
        self
    }

    pub fn with_singleton<A: ComponentDowncast<I> + ?Sized, I: Component>(self) -> Self {
        self.with_binding(Binding::new::<A, I>(Lifetime::Singleton))
    }

    pub fn with_transient<A: ComponentDowncast<I> + ?Sized, I: Component>(self) -> Self {
        self.with_binding(Binding::new::<A, I>(Lifetime::Transient))
    }

    pub fn with_scoped<A: ComponentDowncast<I> + ?Sized, I: Component>(self) -> Self {
        self.with_binding(Binding::new::<A, I>(Lifetime::Scoped))
    }

    /// Registers a component which gets disposed along with the provider caching it.
    pub fn with_disposable<A: ComponentDowncast<I> + ?Sized, I: Component + Disposable>(
        self,
        lifetime: Lifetime,
    ) -> Self {
        self.with_binding(Binding::disposable::<A, I>(lifetime))
    }

    /// Registers an existing value as a singleton.
    pub fn with_instance<T: Injectable + Send + Sync>(self, instance: T) -> Self {
        self.with_binding(Binding::instance(instance))
    }

    /// Replaces all bindings registered so far with the given registry.
    pub fn with_registry(mut self, registry: BindingRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Builds resulting [RootProvider].
    pub fn build(self) -> RootProvider {
        RootProvider::new(self.registry)
    }
}

/// Top-level provider owning all bindings and singleton instances. Singletons are created lazily
/// on first request and live until the provider is disposed or dropped.
pub struct RootProvider {
    registry: BindingRegistry,
    singletons: RefCell<InstanceCache>,
    types_under_construction: RefCell<FxHashSet<TypeId>>,
    disposed: Cell<bool>,
}

impl RootProvider {
    pub fn new(registry: BindingRegistry) -> Self {
        Self {
            registry,
            singletons: Default::default(),
            types_under_construction: Default::default(),
            disposed: Cell::new(false),
        }
    }

    #[inline]
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Resolves a singleton or transient binding. Used by scopes for everything which isn't
    /// scoped, so such instances are always constructed against the root.
    pub(crate) fn root_instance(
        &self,
        binding: &Binding,
    ) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
        match binding.lifetime {
            Lifetime::Singleton => {
                if let Some(instance) = self.singletons.borrow().instance(binding) {
                    trace!(service = binding.abstraction_type.type_name, "Reusing singleton");
                    return Ok(instance);
                }

                let instance = create_instance(binding, self, &self.types_under_construction)?;
                self.singletons
                    .borrow_mut()
                    .store_instance(binding, instance.clone());

                Ok(instance)
            }
            Lifetime::Transient => create_instance(binding, self, &self.types_under_construction),
            Lifetime::Scoped => Err(ComponentInstanceProviderError::InvalidLifetimeUse(
                binding.abstraction_type.type_name,
            )),
        }
    }
}

impl ComponentInstanceProvider for RootProvider {
    fn instance(
        &self,
        key: ServiceKey,
    ) -> Result<(ComponentInstanceAnyPtr, CastFunction), ComponentInstanceProviderError> {
        if self.is_disposed() {
            return Err(ComponentInstanceProviderError::ProviderDisposed);
        }

        let binding = self
            .registry
            .lookup(key.type_id)
            .ok_or(ComponentInstanceProviderError::UnregisteredService(
                key.type_name,
            ))?;

        self.root_instance(binding)
            .map(|instance| (instance, binding.cast))
    }

    /// Scoped bindings are unreachable from the root, so they don't count.
    #[inline]
    fn is_registered(&self, type_id: TypeId) -> bool {
        self.registry
            .lookup(type_id)
            .map_or(false, |binding| binding.lifetime != Lifetime::Scoped)
    }
}

impl ServiceProvider for RootProvider {
    fn create_scope(&self) -> ScopeProvider<'_> {
        ScopeProvider::new(self)
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        debug!(
            singletons = self.singletons.borrow().len(),
            "Disposing root provider"
        );

        self.singletons.borrow_mut().dispose_all();
    }
}

impl Drop for RootProvider {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Constructs a new instance for given binding, guarding against dependency cycles.
pub(crate) fn create_instance(
    binding: &Binding,
    provider: &dyn ComponentInstanceProvider,
    types_under_construction: &RefCell<FxHashSet<TypeId>>,
) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
    let type_id = binding.abstraction_type.type_id;
    if !types_under_construction.borrow_mut().insert(type_id) {
        return Err(ComponentInstanceProviderError::DependencyCycle(
            binding.abstraction_type.type_name,
        ));
    }

    let instance = construct(binding, provider);
    types_under_construction.borrow_mut().remove(&type_id);

    instance
}
