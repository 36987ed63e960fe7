use crate::instance_provider::ErrorPtr;
use thiserror::Error;

/// Errors related to resolving and constructing component instances.
#[derive(Error, Clone, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("No binding registered for service: {0}")]
    UnregisteredService(&'static str),
    #[error("Scoped service '{0}' can only be resolved from a scope provider")]
    InvalidLifetimeUse(&'static str),
    #[error("Type '{0}' does not expose any constructor")]
    NoConstructor(&'static str),
    #[error("None of the constructors of '{0}' can be satisfied by registered services")]
    NoSuitableConstructor(&'static str),
    #[error("Type '{type_name}' has multiple resolvable constructors with {parameter_count} parameters")]
    AmbiguousConstructor {
        type_name: &'static str,
        parameter_count: usize,
    },
    #[error("Detected dependency cycle for service: {0}")]
    DependencyCycle(&'static str),
    #[error("Provider has been disposed")]
    ProviderDisposed,
    #[error("Tried to downcast component to incompatible type: {0}")]
    IncompatibleComponent(&'static str),
    #[error("Constructor requested argument {position}, but only {count} were declared")]
    MissingArgument { position: usize, count: usize },
    #[error("Constructor argument {position} is not of type '{expected}'")]
    IncompatibleArgument {
        position: usize,
        expected: &'static str,
    },
    #[error("Error constructing '{type_name}': {error}")]
    ConstructorError {
        type_name: &'static str,
        error: ErrorPtr,
    },
}
