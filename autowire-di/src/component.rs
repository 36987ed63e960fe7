//! One of the basic blocks of dependency injection is a [Component]. Components are injectable
//! objects, which themselves can depend on other components through their constructors.
//!
//! ## Declaring components
//!
//! Any type which wants to be constructed by a provider needs to implement `Component`, which
//! publishes the list of [Constructors](crate::constructor::Constructor) able to create it. For
//! convenience, the trait can be automatically derived if the `derive` feature is enabled:
//!
//! ```
//! use autowire_di::instance_provider::ComponentInstancePtr;
//! use autowire_di::{component_alias, injectable, Component};
//!
//! #[injectable]
//! trait Logger {
//!     fn log(&self, message: &str);
//! }
//!
//! #[derive(Component)]
//! struct ConsoleLogger;
//!
//! #[component_alias]
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("{message}");
//!     }
//! }
//!
//! #[derive(Component)]
//! struct SqlRepo {
//!     // required service dependency
//!     logger: ComponentInstancePtr<dyn Logger + Send + Sync>,
//!     // optional service dependency - `None` when nothing is registered
//!     fallback: Option<ComponentInstancePtr<ConsoleLogger>>,
//!     // optional value - injected when registered, `Default::default()` otherwise
//!     #[component(default)]
//!     pool_size: u16,
//!     // optional value with a custom default
//!     #[component(default = "default_table")]
//!     table: String,
//! }
//!
//! fn default_table() -> String {
//!     "entries".to_string()
//! }
//! ```
//!
//! ### Supported `#[component]` struct configuration
//!
//! * `constructors = "expr"` - call `expr()` to get the list of constructors, instead of the
//! single generated one; see [crate::constructor] for how multiple constructors are selected
//!
//! ### Supported `#[component]` field configuration
//!
//! * `default` - make the parameter optional and fall back to `Default::default()`
//! * `default = "expr"` - make the parameter optional and fall back to `expr()`
//!
//! ## Binding components to traits
//!
//! Abstractions are usually `dyn Traits`, which makes it possible to request
//! `ComponentInstancePtr<dyn Trait + Send + Sync>` instead of a concrete component type. Each
//! injectable trait should be marked with `#[injectable]`, while each implementation which can be
//! bound to it with `#[component_alias]`.

use crate::constructor::Constructor;
use crate::instance_provider::{ComponentInstanceAnyPtr, ComponentInstancePtr, ErrorPtr};

/// Base trait for components for dependency injection.
///
/// Components are always shared behind a [ComponentInstancePtr], so they need to be `Send + Sync`.
/// Please see the module-level documentation for more information.
pub trait Component: ComponentDowncast<Self> + Sized + Send + Sync {
    /// Returns all constructors able to create this component. The provider picks the one with the
    /// most parameters among those it can satisfy.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Helper trait for abstractions implemented by components, thus allowing injection of components
/// based on `dyn Trait` types. The type `C` refers to a concrete component type. Typically
/// automatically derived when using the `#[component_alias]` attribute.
pub trait ComponentDowncast<C: Component>: Injectable {
    fn downcast(
        source: ComponentInstanceAnyPtr,
    ) -> Result<ComponentInstancePtr<Self>, ComponentInstanceAnyPtr>;
}

/// Marker trait for injectable types - components, abstractions and plain values.
pub trait Injectable: 'static {}

/// Capability of releasing resources when the owning provider is disposed. Only bindings
/// registered as disposable have this called.
pub trait Disposable {
    fn dispose(&self) -> Result<(), ErrorPtr>;
}

macro_rules! injectable_values {
    ($($ty:ty),* $(,)?) => {
        $(impl Injectable for $ty {})*
    };
}

injectable_values!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);
