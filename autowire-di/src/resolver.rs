//! Constructor selection and recursive construction of component instances.
//!
//! The resolver knows nothing about caching or lifetimes. Given a [Binding], it picks the
//! constructor to use and resolves each of its parameters through the given provider, which in
//! turn may call back into the resolver for deeper dependencies.
//!
//! Resolvability is checked one level deep only: a parameter is resolvable when it's optional,
//! when it's a value or text, or when its service type is registered. Failures further down the
//! dependency graph surface when the constructor arguments are actually resolved.

use crate::binding::Binding;
use crate::constructor::{Arguments, ConstructorDefinition, ParameterDefinition, ParameterKind};
use crate::error::ComponentInstanceProviderError;
use crate::instance_provider::{cast_instance, ComponentInstanceAnyPtr, ComponentInstanceProvider};
use itertools::Itertools;
use std::any::Any;
use tracing::debug;

/// Constructs a new instance of the implementation described by `binding`, resolving the
/// constructor parameters with `provider`.
pub fn construct(
    binding: &Binding,
    provider: &dyn ComponentInstanceProvider,
) -> Result<ComponentInstanceAnyPtr, ComponentInstanceProviderError> {
    let constructor = select_constructor(binding, provider)?;

    debug!(
        implementation = binding.implementation_type.type_name,
        parameters = constructor.arity(),
        "Constructing instance"
    );

    let arguments: Vec<Box<dyn Any>> = constructor
        .parameters
        .iter()
        .map(|parameter| resolve_argument(parameter, provider))
        .collect::<Result<_, _>>()?;

    (constructor.factory)(&mut Arguments::new(arguments)).map_err(|error| {
        ComponentInstanceProviderError::ConstructorError {
            type_name: binding.implementation_type.type_name,
            error,
        }
    })
}

/// Picks the resolvable constructor with the most parameters. Two or more such constructors with
/// the same parameter count are an error.
pub fn select_constructor<'b>(
    binding: &'b Binding,
    provider: &dyn ComponentInstanceProvider,
) -> Result<&'b ConstructorDefinition, ComponentInstanceProviderError> {
    let type_name = binding.implementation_type.type_name;
    if binding.constructors.is_empty() {
        return Err(ComponentInstanceProviderError::NoConstructor(type_name));
    }

    let candidates = binding
        .constructors
        .iter()
        .filter(|constructor| {
            constructor
                .parameters
                .iter()
                .all(|parameter| is_resolvable(parameter, provider))
        })
        .collect_vec();

    let parameter_count = candidates
        .iter()
        .map(|constructor| constructor.arity())
        .max()
        .ok_or(ComponentInstanceProviderError::NoSuitableConstructor(
            type_name,
        ))?;

    candidates
        .into_iter()
        .filter(|constructor| constructor.arity() == parameter_count)
        .exactly_one()
        .map_err(|_| ComponentInstanceProviderError::AmbiguousConstructor {
            type_name,
            parameter_count,
        })
}

/// Checks if given parameter can be supplied by the provider, without resolving it.
pub fn is_resolvable(
    parameter: &ParameterDefinition,
    provider: &dyn ComponentInstanceProvider,
) -> bool {
    parameter.is_optional()
        || match parameter.kind {
            ParameterKind::Value | ParameterKind::Text => true,
            ParameterKind::Service => provider.is_registered(parameter.key.type_id),
        }
}

fn resolve_argument(
    parameter: &ParameterDefinition,
    provider: &dyn ComponentInstanceProvider,
) -> Result<Box<dyn Any>, ComponentInstanceProviderError> {
    if let Some(default) = &parameter.default {
        if !provider.is_registered(parameter.key.type_id) {
            return Ok(default());
        }
    }

    let (instance, cast) = provider.instance(parameter.key)?;
    let resolved = cast_instance(instance, cast, parameter.key.type_name)?;

    (parameter.unwrap)(resolved).ok_or(ComponentInstanceProviderError::IncompatibleComponent(
        parameter.key.type_name,
    ))
}

#[cfg(test)]
mod tests {
    use crate::binding::{Binding, Lifetime};
    use crate::component::{Component, ComponentDowncast, Injectable};
    use crate::constructor::Constructor;
    use crate::error::ComponentInstanceProviderError;
    use crate::instance_provider::{
        CastFunction, ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr,
        MockComponentInstanceProvider, ServiceKey,
    };
    use crate::resolver::construct;
    use mockall::predicate::*;
    use std::any::{Any, TypeId};
    use std::sync::Arc;

    macro_rules! test_component {
        ($name:ident { $($field:ident: $ty:ty),* } => $constructors:expr) => {
            struct $name {
                $($field: $ty),*
            }

            impl Injectable for $name {}

            impl ComponentDowncast<$name> for $name {
                fn downcast(
                    source: ComponentInstanceAnyPtr,
                ) -> Result<ComponentInstancePtr<Self>, ComponentInstanceAnyPtr> {
                    source.downcast()
                }
            }

            impl Component for $name {
                fn constructors() -> Vec<Constructor<Self>> {
                    $constructors
                }
            }
        };
    }

    test_component!(TestDependency1 {} => vec![Constructor::new(|_| Ok(TestDependency1 {}))]);

    test_component!(TestDependency2 {} => vec![Constructor::new(|_| Ok(TestDependency2 {}))]);

    test_component!(NoConstructorComponent {} => vec![]);

    test_component!(AmbiguousComponent {} => vec![
        Constructor::new(|arguments| {
            arguments.service::<TestDependency1>()?;
            Ok(AmbiguousComponent {})
        })
        .with_service::<TestDependency1>(),
        Constructor::new(|arguments| {
            arguments.service::<TestDependency2>()?;
            Ok(AmbiguousComponent {})
        })
        .with_service::<TestDependency2>(),
    ]);

    test_component!(MultiConstructorComponent { selected: usize } => vec![
        Constructor::new(|_| Ok(MultiConstructorComponent { selected: 0 })),
        Constructor::new(|arguments| {
            arguments.service::<TestDependency1>()?;
            Ok(MultiConstructorComponent { selected: 1 })
        })
        .with_service::<TestDependency1>(),
        Constructor::new(|arguments| {
            arguments.service::<TestDependency1>()?;
            arguments.service::<TestDependency2>()?;
            Ok(MultiConstructorComponent { selected: 2 })
        })
        .with_service::<TestDependency1>()
        .with_service::<TestDependency2>(),
    ]);

    test_component!(OptionalComponent {
        dependency: Option<ComponentInstancePtr<TestDependency2>>,
        port: u16
    } => vec![
        Constructor::new(|arguments| {
            Ok(OptionalComponent {
                dependency: arguments.optional_service()?,
                port: arguments.value()?,
            })
        })
        .with_optional_service::<TestDependency2>()
        .with_value_or(8080u16),
    ]);

    test_component!(ValueComponent { port: u16 } => vec![
        Constructor::new(|arguments| Ok(ValueComponent { port: arguments.value()? }))
            .with_value::<u16>(),
    ]);

    test_component!(FailingComponent {} => vec![
        Constructor::new(|_| {
            Err(Arc::new(ComponentInstanceProviderError::ProviderDisposed) as ErrorPtr)
        }),
    ]);

    fn dependency1_cast(
        instance: ComponentInstanceAnyPtr,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        instance
            .downcast::<TestDependency1>()
            .map(|instance| Box::new(instance) as Box<dyn Any>)
    }

    fn dependency2_cast(
        instance: ComponentInstanceAnyPtr,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        instance
            .downcast::<TestDependency2>()
            .map(|instance| Box::new(instance) as Box<dyn Any>)
    }

    fn create_provider(registered: Vec<TypeId>) -> MockComponentInstanceProvider {
        let mut provider = MockComponentInstanceProvider::new();
        provider
            .expect_is_registered()
            .returning(move |type_id| registered.contains(&type_id));
        provider
            .expect_instance()
            .with(eq(ServiceKey::of::<TestDependency1>()))
            .returning(|_| {
                Ok((
                    ComponentInstancePtr::new(TestDependency1 {}) as ComponentInstanceAnyPtr,
                    dependency1_cast as CastFunction,
                ))
            });
        provider
            .expect_instance()
            .with(eq(ServiceKey::of::<TestDependency2>()))
            .returning(|_| {
                Ok((
                    ComponentInstancePtr::new(TestDependency2 {}) as ComponentInstanceAnyPtr,
                    dependency2_cast as CastFunction,
                ))
            });
        provider
            .expect_instance()
            .with(eq(ServiceKey::of::<u16>()))
            .returning(|key| Err(ComponentInstanceProviderError::UnregisteredService(key.type_name)));

        provider
    }

    fn construct_typed<T: Component>(
        provider: &MockComponentInstanceProvider,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        construct(&Binding::new::<T, T>(Lifetime::Transient), provider)
            .map(|instance| instance.downcast::<T>().ok().unwrap())
    }

    #[test]
    fn should_reject_type_without_constructors() {
        let provider = create_provider(vec![]);
        assert!(matches!(
            construct_typed::<NoConstructorComponent>(&provider).err().unwrap(),
            ComponentInstanceProviderError::NoConstructor(..)
        ));
    }

    #[test]
    fn should_reject_unsatisfiable_constructors() {
        let provider = create_provider(vec![]);
        assert!(matches!(
            construct_typed::<AmbiguousComponent>(&provider).err().unwrap(),
            ComponentInstanceProviderError::NoSuitableConstructor(..)
        ));
    }

    #[test]
    fn should_reject_ambiguous_constructors() {
        let provider = create_provider(vec![
            TypeId::of::<TestDependency1>(),
            TypeId::of::<TestDependency2>(),
        ]);
        assert!(matches!(
            construct_typed::<AmbiguousComponent>(&provider).err().unwrap(),
            ComponentInstanceProviderError::AmbiguousConstructor {
                parameter_count: 1,
                ..
            }
        ));
    }

    #[test]
    fn should_use_single_resolvable_constructor_of_tie() {
        let provider = create_provider(vec![TypeId::of::<TestDependency2>()]);
        assert!(construct_typed::<AmbiguousComponent>(&provider).is_ok());
    }

    #[test]
    fn should_select_largest_resolvable_constructor() {
        let provider = create_provider(vec![TypeId::of::<TestDependency1>()]);
        assert_eq!(
            construct_typed::<MultiConstructorComponent>(&provider)
                .unwrap()
                .selected,
            1
        );

        let provider = create_provider(vec![
            TypeId::of::<TestDependency1>(),
            TypeId::of::<TestDependency2>(),
        ]);
        assert_eq!(
            construct_typed::<MultiConstructorComponent>(&provider)
                .unwrap()
                .selected,
            2
        );

        let provider = create_provider(vec![]);
        assert_eq!(
            construct_typed::<MultiConstructorComponent>(&provider)
                .unwrap()
                .selected,
            0
        );
    }

    #[test]
    fn should_use_defaults_for_unregistered_optional_parameters() {
        let provider = create_provider(vec![]);
        let component = construct_typed::<OptionalComponent>(&provider).unwrap();

        assert!(component.dependency.is_none());
        assert_eq!(component.port, 8080);
    }

    #[test]
    fn should_resolve_registered_optional_parameters() {
        let provider = create_provider(vec![TypeId::of::<TestDependency2>()]);
        let component = construct_typed::<OptionalComponent>(&provider).unwrap();

        assert!(component.dependency.is_some());
    }

    #[test]
    fn should_treat_values_as_resolvable_but_fail_on_resolution() {
        let provider = create_provider(vec![]);
        assert!(matches!(
            construct_typed::<ValueComponent>(&provider).err().unwrap(),
            ComponentInstanceProviderError::UnregisteredService(..)
        ));
    }

    #[test]
    fn should_forward_constructor_error() {
        let provider = create_provider(vec![]);
        assert!(matches!(
            construct_typed::<FailingComponent>(&provider).err().unwrap(),
            ComponentInstanceProviderError::ConstructorError { .. }
        ));
    }
}
