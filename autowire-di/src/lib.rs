//! Minimal dependency injection container with constructor autowiring.
//!
//! Implementations are registered as [Bindings](binding::Binding) of an abstraction (a component
//! type or `dyn Trait + Send + Sync`) to a [Component](component::Component), along with a
//! [Lifetime](binding::Lifetime). A [RootProvider](provider::RootProvider) then resolves
//! requested abstractions, picking the most specific satisfiable constructor of each
//! implementation and recursively resolving its parameters. Scoped instances live in
//! [ScopeProviders](scope::ScopeProvider) created from the root.

pub mod binding;
pub mod binding_registry;
pub mod cache;
pub mod component;
pub mod constructor;
mod error;
pub mod instance_provider;
pub mod provider;
pub mod resolver;
pub mod scope;

pub use error::ComponentInstanceProviderError;

#[cfg(feature = "derive")]
pub use autowire_di_derive::{component_alias, injectable, Component};
