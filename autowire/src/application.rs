//! Core application framework functionality.

use crate::config::ApplicationConfig;
use crate::runner::{resolve_runner, ApplicationRunner, RunnerResolver};
use autowire_di::binding::Binding;
use autowire_di::component::{Component, Injectable};
use autowire_di::instance_provider::ErrorPtr;
use autowire_di::provider::{ProviderBuilder, RootProvider, ServiceProvider};
use autowire_di::ComponentInstanceProviderError;
use config::ConfigError;
use derive_more::Constructor;
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Error retrieving runners: {0}")]
    RunnerInjectionError(ComponentInstanceProviderError),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

/// Builder for [Application], collecting bindings and runners.
#[derive(Default)]
pub struct ApplicationBuilder {
    provider_builder: ProviderBuilder,
    runners: Vec<RunnerResolver>,
    config: Option<ApplicationConfig>,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding available to all components and runners.
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.provider_builder = self.provider_builder.with_binding(binding);
        self
    }

    pub fn with_bindings<I: IntoIterator<Item = Binding>>(self, bindings: I) -> Self {
        bindings
            .into_iter()
            .fold(self, |builder, binding| builder.with_binding(binding))
    }

    /// Registers a runner component. Runners are scoped, so each run gets its own instance and
    /// can depend on scoped components.
    pub fn with_runner<R: ApplicationRunner + Component>(mut self) -> Self {
        self.provider_builder = self.provider_builder.with_scoped::<R, R>();
        self.runners.push(resolve_runner::<R>);
        self
    }

    /// Registers an already created runner.
    pub fn with_runner_instance<R: ApplicationRunner + Injectable + Send + Sync>(
        mut self,
        runner: R,
    ) -> Self {
        self.provider_builder = self.provider_builder.with_instance(runner);
        self.runners.push(resolve_runner::<R>);
        self
    }

    /// Uses given config instead of loading it from the environment.
    pub fn with_config(mut self, config: ApplicationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the config, installs the tracing logger if requested and builds the container. The
    /// config is registered as a singleton instance, unless another binding for
    /// [ApplicationConfig] has been registered before.
    pub fn build(self) -> Result<Application, ApplicationError> {
        let config = match self.config {
            Some(config) => config,
            None => ApplicationConfig::init_from_environment()?,
        };

        if config.install_tracing_logger {
            install_tracing_logger(&config.log_filter);
        }

        Ok(Application::new(
            self.provider_builder.with_instance(config).build(),
            self.runners,
        ))
    }
}

fn install_tracing_logger(log_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        debug!("Global tracing subscriber already installed - skipping logger installation.");
    }
}

/// Main entrypoint for the application. Owns the [RootProvider] and runs
/// [ApplicationRunners](crate::runner::ApplicationRunner).
#[derive(Constructor)]
pub struct Application {
    provider: RootProvider,
    runners: Vec<RunnerResolver>,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    #[inline]
    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    /// Runs all registered runners, ordered by descending priority, and disposes the provider.
    pub fn run(self) -> Result<(), ApplicationError> {
        info!("Resolving application runners...");

        let mut runners = self
            .runners
            .iter()
            .copied()
            .map(|resolver| {
                let scope = self.provider.create_scope();
                resolver(&scope).map(|runner| (scope, runner))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApplicationError::RunnerInjectionError)?;

        runners.sort_by_key(|(_, runner)| Reverse(runner.priority()));

        info!("Running application runners...");

        for (_, runner) in &runners {
            runner.run().map_err(ApplicationError::RunnerError)?;
        }

        drop(runners);

        info!("Shutting down...");
        self.provider.dispose();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{Application, ApplicationError};
    use crate::config::ApplicationConfig;
    use crate::runner::{ApplicationRunner, ErrorPtr, MockApplicationRunner};
    use autowire_di::binding::{Binding, Lifetime};
    use autowire_di::component::{Component, ComponentDowncast, Disposable, Injectable};
    use autowire_di::constructor::Constructor;
    use autowire_di::instance_provider::{
        ComponentInstanceAnyPtr, ComponentInstancePtr, TypedComponentInstanceProvider,
    };
    use autowire_di::ComponentInstanceProviderError;
    use std::sync::{Arc, Mutex};

    impl Injectable for MockApplicationRunner {}

    #[derive(Default, Clone)]
    struct ExecutionLog(Arc<Mutex<Vec<&'static str>>>);

    impl Injectable for ExecutionLog {}

    impl ExecutionLog {
        fn push(&self, entry: &'static str) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct RecordingRunner {
        log: ComponentInstancePtr<ExecutionLog>,
    }

    impl Injectable for RecordingRunner {}

    impl ComponentDowncast<RecordingRunner> for RecordingRunner {
        fn downcast(
            source: ComponentInstanceAnyPtr,
        ) -> Result<ComponentInstancePtr<Self>, ComponentInstanceAnyPtr> {
            source.downcast()
        }
    }

    impl Component for RecordingRunner {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|arguments| {
                Ok(Self {
                    log: arguments.service()?,
                })
            })
            .with_service::<ExecutionLog>()]
        }
    }

    impl ApplicationRunner for RecordingRunner {
        fn run(&self) -> Result<(), ErrorPtr> {
            self.log.push("run");
            Ok(())
        }
    }

    impl Disposable for RecordingRunner {
        fn dispose(&self) -> Result<(), ErrorPtr> {
            self.log.push("dispose");
            Ok(())
        }
    }

    fn test_config() -> ApplicationConfig {
        ApplicationConfig::new(false, "off")
    }

    #[test]
    fn should_run_runners_by_priority() {
        let log = ExecutionLog::default();

        let mut runner = MockApplicationRunner::new();
        runner.expect_priority().return_const(10);
        let mock_log = log.clone();
        runner.expect_run().times(1).returning(move || {
            mock_log.push("mock");
            Ok(())
        });

        let application = Application::builder()
            .with_config(test_config())
            .with_binding(Binding::instance(log.clone()))
            .with_runner::<RecordingRunner>()
            .with_runner_instance(runner)
            .build()
            .unwrap();

        application.run().unwrap();

        assert_eq!(log.entries(), vec!["mock", "run"]);
    }

    #[test]
    fn should_dispose_scoped_runners() {
        let log = ExecutionLog::default();

        let application = Application::builder()
            .with_config(test_config())
            .with_binding(Binding::instance(log.clone()))
            .with_binding(Binding::disposable::<RecordingRunner, RecordingRunner>(
                Lifetime::Scoped,
            ))
            .with_runner::<RecordingRunner>()
            .build()
            .unwrap();

        application.run().unwrap();

        assert_eq!(log.entries(), vec!["run", "dispose"]);
    }

    #[test]
    fn should_return_injection_error() {
        let application = Application::builder()
            .with_config(test_config())
            .with_runner::<RecordingRunner>()
            .build()
            .unwrap();

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::RunnerInjectionError(
                ComponentInstanceProviderError::NoSuitableConstructor(..)
            )
        ));
    }

    #[test]
    fn should_return_runner_error() {
        let mut runner = MockApplicationRunner::new();
        runner.expect_priority().return_const(0);
        runner.expect_run().times(1).returning(|| {
            Err(Arc::new(ComponentInstanceProviderError::ProviderDisposed) as ErrorPtr)
        });

        let application = Application::builder()
            .with_config(test_config())
            .with_runner_instance(runner)
            .build()
            .unwrap();

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::RunnerError(_)
        ));
    }

    #[test]
    fn should_register_config() {
        let application = Application::builder()
            .with_config(test_config())
            .build()
            .unwrap();

        let config = application
            .provider()
            .resolve::<ApplicationConfig>()
            .unwrap();
        assert_eq!(*config, test_config());
    }
}
