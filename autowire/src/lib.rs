//! Application framework based on [autowire_di] dependency injection.
//!
//! Traditional applications start in the `main()` function and often explicitly initialize and pass
//! around various domain/application services or other components. With dependency injection in
//! place, all application components can become decoupled and form a dependency graph managed by a
//! DI container. This, in turn, requires an entrypoint for the application which initializes DI and
//! runs the actual business logic of the application. This crate provides such entrypoint in the
//! form of [Application](application::Application), which also configures additional supporting
//! infrastructure, e.g. logging, and disposes the container on shutdown.

pub mod application;
pub mod config;
pub mod runner;
