//! [Bindings](Binding) map an abstraction to the implementation constructed when the abstraction
//! is requested, along with the [Lifetime] of created instances.

use crate::component::{Component, ComponentDowncast, Disposable, Injectable};
use crate::constructor::{Arguments, ConstructorDefinition};
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{
    CastFunction, ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr, ServiceKey,
};
use derivative::Derivative;
use std::any::{type_name, Any};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Releases resources held by a type-erased instance.
pub type DisposeFunction = fn(instance: &ComponentInstanceAnyPtr) -> Result<(), ErrorPtr>;

/// Decides how many instances of a binding exist and how long they live.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Lifetime {
    /// One instance per root provider, created on first request.
    Singleton,
    /// New instance on each request.
    Transient,
    /// One instance per scope; can only be requested from a scope provider.
    Scoped,
}

/// Immutable registration of an implementation for an abstraction. Bindings are compared by
/// abstraction type only.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Binding {
    pub abstraction_type: ServiceKey,

    pub implementation_type: ServiceKey,

    pub lifetime: Lifetime,

    /// Constructor candidates of the implementation type.
    pub constructors: Vec<ConstructorDefinition>,

    /// Casts an instance of the implementation to `ComponentInstancePtr<Abstraction>`.
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,

    /// Present only for implementations registered as [Disposable].
    #[derivative(Debug = "ignore")]
    pub dispose: Option<DisposeFunction>,
}

impl Binding {
    /// Binds abstraction `A` (usually `dyn Trait + Send + Sync` or the component itself) to
    /// component `I`.
    pub fn new<A: ComponentDowncast<I> + ?Sized, I: Component>(lifetime: Lifetime) -> Self {
        Self {
            abstraction_type: ServiceKey::of::<A>(),
            implementation_type: ServiceKey::of::<I>(),
            lifetime,
            constructors: I::constructors()
                .into_iter()
                .map(ConstructorDefinition::from)
                .collect(),
            cast: cast::<A, I>,
            dispose: None,
        }
    }

    /// Like [Binding::new], but cached instances get disposed along with their provider.
    pub fn disposable<A: ComponentDowncast<I> + ?Sized, I: Component + Disposable>(
        lifetime: Lifetime,
    ) -> Self {
        Self {
            dispose: Some(dispose::<I>),
            ..Self::new::<A, I>(lifetime)
        }
    }

    /// Binds an already existing value as a singleton. Useful for configuration and other plain
    /// values injected into constructors.
    pub fn instance<T: Injectable + Send + Sync>(instance: T) -> Self {
        let instance = ComponentInstancePtr::new(instance) as ComponentInstanceAnyPtr;
        Self {
            abstraction_type: ServiceKey::of::<T>(),
            implementation_type: ServiceKey::of::<T>(),
            lifetime: Lifetime::Singleton,
            constructors: vec![ConstructorDefinition {
                parameters: vec![],
                factory: Arc::new(move |_: &mut Arguments| Ok::<_, ErrorPtr>(instance.clone())),
            }],
            cast: cast_value::<T>,
            dispose: None,
        }
    }

    #[inline]
    pub fn is_disposable(&self) -> bool {
        self.dispose.is_some()
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.abstraction_type == other.abstraction_type
    }
}

impl Eq for Binding {}

impl Hash for Binding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.abstraction_type.hash(state);
    }
}

fn cast<Source: ComponentDowncast<Target> + ?Sized, Target: Component>(
    instance: ComponentInstanceAnyPtr,
) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
    Source::downcast(instance).map(|instance| Box::new(instance) as Box<dyn Any>)
}

fn cast_value<T: Any + Send + Sync>(
    instance: ComponentInstanceAnyPtr,
) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
    instance
        .downcast::<T>()
        .map(|instance| Box::new(instance) as Box<dyn Any>)
}

fn dispose<T: Disposable + Any + Send + Sync>(
    instance: &ComponentInstanceAnyPtr,
) -> Result<(), ErrorPtr> {
    (**instance)
        .downcast_ref::<T>()
        .ok_or_else(|| {
            Arc::new(ComponentInstanceProviderError::IncompatibleComponent(
                type_name::<T>(),
            )) as ErrorPtr
        })
        .and_then(Disposable::dispose)
}
