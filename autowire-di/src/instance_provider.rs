//! Type-erased and strongly-typed access to component instances.

use crate::component::Injectable;
use crate::error::ComponentInstanceProviderError;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, Any, TypeId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ComponentInstancePtr<T> = Arc<T>;

pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Error returned by user code, e.g. constructors or disposal.
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Casts a type-erased instance of a concrete implementation to a boxed
/// `ComponentInstancePtr<Abstraction>`. Returns the original instance if the cast is impossible.
pub type CastFunction =
    fn(instance: ComponentInstanceAnyPtr) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr>;

/// Identity of an abstraction or implementation type, with a readable name for diagnostics.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ServiceKey {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceKey {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

impl Display for ServiceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Generic provider for component instances. Implemented by both the root provider and scopes;
/// constructors see only this interface when their dependencies are resolved.
#[cfg_attr(test, automock)]
pub trait ComponentInstanceProvider {
    /// Resolves an instance bound to the given abstraction, along with the function able to cast
    /// it to the abstraction pointer.
    fn instance(
        &self,
        key: ServiceKey,
    ) -> Result<(ComponentInstanceAnyPtr, CastFunction), ComponentInstanceProviderError>;

    /// Checks if given abstraction is reachable from this provider.
    fn is_registered(&self, type_id: TypeId) -> bool;
}

/// Helper trait for [ComponentInstanceProvider] providing strongly-typed access.
pub trait TypedComponentInstanceProvider {
    /// Typesafe version of [ComponentInstanceProvider::instance].
    fn resolve<T: Injectable + ?Sized>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError>;

    /// Tries to get an instance like [TypedComponentInstanceProvider::resolve] does, but returns
    /// `None` when the abstraction is not registered at all.
    fn resolve_option<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, ComponentInstanceProviderError>;
}

impl<CIP: ComponentInstanceProvider + ?Sized> TypedComponentInstanceProvider for CIP {
    fn resolve<T: Injectable + ?Sized>(
        &self,
    ) -> Result<ComponentInstancePtr<T>, ComponentInstanceProviderError> {
        let (instance, cast) = self.instance(ServiceKey::of::<T>())?;
        cast_instance(instance, cast, type_name::<T>())?
            .downcast::<ComponentInstancePtr<T>>()
            .map(|instance| *instance)
            .map_err(|_| ComponentInstanceProviderError::IncompatibleComponent(type_name::<T>()))
    }

    fn resolve_option<T: Injectable + ?Sized>(
        &self,
    ) -> Result<Option<ComponentInstancePtr<T>>, ComponentInstanceProviderError> {
        if self.is_registered(TypeId::of::<T>()) {
            self.resolve::<T>().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[inline]
pub(crate) fn cast_instance(
    instance: ComponentInstanceAnyPtr,
    cast: CastFunction,
    target_name: &'static str,
) -> Result<Box<dyn Any>, ComponentInstanceProviderError> {
    cast(instance).map_err(|_| ComponentInstanceProviderError::IncompatibleComponent(target_name))
}

#[cfg(test)]
mod tests {
    use crate::component::Injectable;
    use crate::error::ComponentInstanceProviderError;
    use crate::instance_provider::{
        CastFunction, ComponentInstanceAnyPtr, ComponentInstancePtr, MockComponentInstanceProvider,
        ServiceKey, TypedComponentInstanceProvider,
    };
    use mockall::predicate::*;
    use std::any::{Any, TypeId};

    struct TestService(i8);

    impl Injectable for TestService {}

    fn cast(instance: ComponentInstanceAnyPtr) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        instance
            .downcast::<TestService>()
            .map(|instance| Box::new(instance) as Box<dyn Any>)
    }

    fn failing_cast(
        instance: ComponentInstanceAnyPtr,
    ) -> Result<Box<dyn Any>, ComponentInstanceAnyPtr> {
        Err(instance)
    }

    #[test]
    fn should_resolve_typed_instance() {
        let mut provider = MockComponentInstanceProvider::new();
        provider
            .expect_instance()
            .with(eq(ServiceKey::of::<TestService>()))
            .times(1)
            .returning(|_| {
                Ok((
                    ComponentInstancePtr::new(TestService(5)) as ComponentInstanceAnyPtr,
                    cast as CastFunction,
                ))
            });

        assert_eq!(provider.resolve::<TestService>().unwrap().0, 5);
    }

    #[test]
    fn should_report_incompatible_cast() {
        let mut provider = MockComponentInstanceProvider::new();
        provider.expect_instance().returning(|_| {
            Ok((
                ComponentInstancePtr::new(TestService(5)) as ComponentInstanceAnyPtr,
                failing_cast as CastFunction,
            ))
        });

        assert!(matches!(
            provider.resolve::<TestService>().err().unwrap(),
            ComponentInstanceProviderError::IncompatibleComponent(..)
        ));
    }

    #[test]
    fn should_return_none_for_unregistered_option() {
        let mut provider = MockComponentInstanceProvider::new();
        provider
            .expect_is_registered()
            .with(eq(TypeId::of::<TestService>()))
            .return_const(false);
        provider.expect_instance().never();

        assert!(provider.resolve_option::<TestService>().unwrap().is_none());
    }

    #[test]
    fn should_forward_errors_for_registered_option() {
        let mut provider = MockComponentInstanceProvider::new();
        provider.expect_is_registered().return_const(true);
        provider
            .expect_instance()
            .returning(|_| Err(ComponentInstanceProviderError::ProviderDisposed));

        assert!(matches!(
            provider.resolve_option::<TestService>().err().unwrap(),
            ComponentInstanceProviderError::ProviderDisposed
        ));
    }
}
