//! Explicit constructor tables for [Components](crate::component::Component).
//!
//! A component may expose several [Constructors](Constructor), each declaring its parameters in
//! order. When a component is requested, the [resolver](crate::resolver) keeps the constructors
//! whose parameters can all be satisfied, picks the one with the most parameters and refuses to
//! guess when two of them tie. A parameter can be satisfied when it's optional (has a default),
//! when it's a plain value or text, or when its service type is registered in the provider.
//!
//! ```
//! use autowire_di::constructor::Constructor;
//! use autowire_di::instance_provider::ComponentInstancePtr;
//! use autowire_di::Component;
//!
//! #[derive(Component)]
//! struct Clock;
//!
//! #[derive(Component)]
//! #[component(constructors = "Scheduler::all_constructors")]
//! struct Scheduler {
//!     clock: Option<ComponentInstancePtr<Clock>>,
//!     workers: u8,
//! }
//!
//! impl Scheduler {
//!     fn all_constructors() -> Vec<Constructor<Self>> {
//!         vec![
//!             Constructor::new(|_| Ok(Self { clock: None, workers: 1 })),
//!             Constructor::new(|arguments| {
//!                 Ok(Self {
//!                     clock: Some(arguments.service()?),
//!                     workers: arguments.value()?,
//!                 })
//!             })
//!             .with_service::<Clock>()
//!             .with_value_or(4u8),
//!         ]
//!     }
//! }
//! ```

use crate::component::{Component, Injectable};
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr, ServiceKey};
use derivative::Derivative;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Produces the argument for an optional parameter which cannot be resolved.
pub type DefaultFunction = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Converts a boxed `ComponentInstancePtr<T>` returned by a provider into the argument type
/// expected by the constructor.
pub type UnwrapFunction = fn(resolved: Box<dyn Any>) -> Option<Box<dyn Any>>;

/// Type-erased constructor producing a component instance from resolved [Arguments].
pub type ConstructorFunction = Arc<
    dyn Fn(&mut Arguments) -> Result<ComponentInstanceAnyPtr, ErrorPtr> + Send + Sync + 'static,
>;

/// Category of a constructor parameter, deciding whether it is resolvable.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum ParameterKind {
    /// Another component or abstraction; resolvable only when registered.
    Service,
    /// Primitive or other plain value type; always considered resolvable.
    Value,
    /// Textual value; always considered resolvable.
    Text,
}

/// Declared parameter of a constructor.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ParameterDefinition {
    /// Type requested from the provider.
    pub key: ServiceKey,

    pub kind: ParameterKind,

    /// Optional parameters fall back to this when the provider cannot supply the type.
    #[derivative(Debug = "ignore")]
    pub default: Option<DefaultFunction>,

    #[derivative(Debug = "ignore")]
    pub unwrap: UnwrapFunction,
}

impl ParameterDefinition {
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Type-erased [Constructor], as stored in a [Binding](crate::binding::Binding).
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ConstructorDefinition {
    pub parameters: Vec<ParameterDefinition>,

    #[derivative(Debug = "ignore")]
    pub factory: ConstructorFunction,
}

impl ConstructorDefinition {
    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl<C: Component> From<Constructor<C>> for ConstructorDefinition {
    fn from(constructor: Constructor<C>) -> Self {
        let factory = constructor.factory;
        Self {
            parameters: constructor.parameters,
            factory: Arc::new(move |arguments: &mut Arguments| {
                factory(arguments).map(|instance| {
                    ComponentInstancePtr::new(instance) as ComponentInstanceAnyPtr
                })
            }),
        }
    }
}

/// Strongly-typed constructor of component `C`. Parameters are declared in the same order the
/// factory consumes them from [Arguments].
pub struct Constructor<C> {
    parameters: Vec<ParameterDefinition>,
    factory: fn(&mut Arguments) -> Result<C, ErrorPtr>,
}

impl<C: Component> Constructor<C> {
    pub fn new(factory: fn(&mut Arguments) -> Result<C, ErrorPtr>) -> Self {
        Self {
            parameters: Vec::new(),
            factory,
        }
    }

    /// Adds a required dependency on `T`, consumed with [Arguments::service].
    pub fn with_service<T: Injectable + ?Sized>(self) -> Self {
        self.with_parameter(ParameterDefinition {
            key: ServiceKey::of::<T>(),
            kind: ParameterKind::Service,
            default: None,
            unwrap: unwrap_service,
        })
    }

    /// Adds an optional dependency on `T`, consumed with [Arguments::optional_service].
    pub fn with_optional_service<T: Injectable + ?Sized>(self) -> Self {
        self.with_parameter(ParameterDefinition {
            key: ServiceKey::of::<T>(),
            kind: ParameterKind::Service,
            default: Some(Arc::new(|| {
                Box::new(Option::<ComponentInstancePtr<T>>::None) as Box<dyn Any>
            })),
            unwrap: unwrap_optional_service::<T>,
        })
    }

    /// Adds a required value, consumed with [Arguments::value]. The value is taken from a
    /// registered instance of `V`.
    pub fn with_value<V: Injectable + Clone + Send + Sync>(self) -> Self {
        self.with_parameter(value_parameter::<V>(None))
    }

    /// Adds an optional value, falling back to `default` when `V` is not registered.
    pub fn with_value_or<V: Injectable + Clone + Send + Sync>(self, default: V) -> Self {
        self.with_parameter(value_parameter::<V>(Some(Arc::new(move || {
            Box::new(default.clone()) as Box<dyn Any>
        }))))
    }

    /// Adds an optional value, falling back to `default()` when `V` is not registered.
    pub fn with_value_or_else<V: Injectable + Clone + Send + Sync>(
        self,
        default: fn() -> V,
    ) -> Self {
        self.with_parameter(value_parameter::<V>(Some(Arc::new(move || {
            Box::new(default()) as Box<dyn Any>
        }))))
    }

    /// Adds an optional value, falling back to `V::default()` when `V` is not registered.
    pub fn with_default_value<V: Injectable + Clone + Default + Send + Sync>(self) -> Self {
        self.with_value_or_else(V::default)
    }

    #[inline]
    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    fn with_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }
}

fn value_parameter<V: Injectable + Clone + Send + Sync>(
    default: Option<DefaultFunction>,
) -> ParameterDefinition {
    let kind = if TypeId::of::<V>() == TypeId::of::<String>() {
        ParameterKind::Text
    } else {
        ParameterKind::Value
    };

    ParameterDefinition {
        key: ServiceKey::of::<V>(),
        kind,
        default,
        unwrap: unwrap_value::<V>,
    }
}

fn unwrap_service(resolved: Box<dyn Any>) -> Option<Box<dyn Any>> {
    Some(resolved)
}

fn unwrap_optional_service<T: ?Sized + 'static>(resolved: Box<dyn Any>) -> Option<Box<dyn Any>> {
    resolved
        .downcast::<ComponentInstancePtr<T>>()
        .ok()
        .map(|instance| Box::new(Some(*instance)) as Box<dyn Any>)
}

fn unwrap_value<V: Clone + 'static>(resolved: Box<dyn Any>) -> Option<Box<dyn Any>> {
    resolved
        .downcast::<ComponentInstancePtr<V>>()
        .ok()
        .map(|instance| Box::new(V::clone(&instance)) as Box<dyn Any>)
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    values: Vec<Option<Box<dyn Any>>>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Box<dyn Any>>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
            position: 0,
        }
    }

    /// Takes the next argument, which must be of type `T`.
    pub fn take<T: 'static>(&mut self) -> Result<T, ErrorPtr> {
        let position = self.position;
        let count = self.values.len();
        let value = self
            .values
            .get_mut(position)
            .and_then(Option::take)
            .ok_or_else(|| {
                Arc::new(ComponentInstanceProviderError::MissingArgument { position, count })
                    as ErrorPtr
            })?;

        self.position += 1;

        value.downcast::<T>().map(|value| *value).map_err(|_| {
            Arc::new(ComponentInstanceProviderError::IncompatibleArgument {
                position,
                expected: type_name::<T>(),
            }) as ErrorPtr
        })
    }

    /// Takes the next argument declared with [Constructor::with_service].
    #[inline]
    pub fn service<T: ?Sized + 'static>(&mut self) -> Result<ComponentInstancePtr<T>, ErrorPtr> {
        self.take()
    }

    /// Takes the next argument declared with [Constructor::with_optional_service].
    #[inline]
    pub fn optional_service<T: ?Sized + 'static>(
        &mut self,
    ) -> Result<Option<ComponentInstancePtr<T>>, ErrorPtr> {
        self.take()
    }

    /// Takes the next argument declared as a value.
    #[inline]
    pub fn value<V: 'static>(&mut self) -> Result<V, ErrorPtr> {
        self.take()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
