//! Runners executing actual application logic.

use autowire_di::component::Injectable;
use autowire_di::injectable;
pub use autowire_di::instance_provider::ErrorPtr;
use autowire_di::instance_provider::{
    ComponentInstanceProvider, ComponentInstancePtr, TypedComponentInstanceProvider,
};
use autowire_di::ComponentInstanceProviderError;
#[cfg(test)]
use mockall::automock;

pub type ApplicationRunnerPtr = dyn ApplicationRunner + Send + Sync;

/// Resolves a registered runner from given provider.
pub type RunnerResolver = fn(
    provider: &dyn ComponentInstanceProvider,
) -> Result<ComponentInstancePtr<ApplicationRunnerPtr>, ComponentInstanceProviderError>;

/// Runs application logic. Runners are registered with the
/// [ApplicationBuilder](crate::application::ApplicationBuilder) and run by the
/// [Application](crate::application::Application), each in its own scope, so they can depend on
/// scoped components.
#[injectable]
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}

pub(crate) fn resolve_runner<R: ApplicationRunner + Injectable + Send + Sync>(
    provider: &dyn ComponentInstanceProvider,
) -> Result<ComponentInstancePtr<ApplicationRunnerPtr>, ComponentInstanceProviderError> {
    provider
        .resolve::<R>()
        .map(|runner| runner as ComponentInstancePtr<ApplicationRunnerPtr>)
}
