//! # Zenject
//!
//! A binding and resolution engine for dependency injection.
//!
//! Bindings associate a contract type (usually a `dyn Trait`) and an optional identifier
//! with a [`Provider`] that knows how to produce instances. Resolution looks up the
//! bindings for a request, honors their conditions and scopes, and detects circular
//! dependencies along the resolution chain.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry and resolver. Containers form a hierarchy through
//!   [`Container::create_sub_container`]; a request falls back to the parent when the
//!   child has no binding for it.
//! - **Binder chain**: `container.bind::<T>()` starts a fluent chain that chooses the
//!   concrete type, the provider, the scope and the conditions, and ends in `finish()`.
//! - **Scopes**: `Transient` builds a new instance per request, `Cached` keeps one per
//!   binding, `Single` keeps one per concrete type at the root container.
//! - **Injectable**: types the container can build describe their members explicitly
//!   through the [`Injectable`] trait.
//! - **Project container**: a process-wide root container, available through
//!   [`project()`] and the [`resolve!`] macro.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use zenject::{Container, Injectable, Injector, InjectableMember, Result};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[console] {}", message)
//!     }
//! }
//!
//! impl Injectable for ConsoleLogger {
//!     fn construct(_: &mut Injector<'_>) -> Result<Self> {
//!         Ok(ConsoleLogger)
//!     }
//! }
//!
//! struct Greeter {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Injectable for Greeter {
//!     fn dependencies() -> Vec<InjectableMember> {
//!         vec![InjectableMember::of::<dyn Logger>("logger")]
//!     }
//!
//!     fn construct(injector: &mut Injector<'_>) -> Result<Self> {
//!         Ok(Greeter { logger: injector.resolve()? })
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let container = Container::new();
//!     container
//!         .bind::<dyn Logger>()
//!         .to::<ConsoleLogger>(|logger| logger)
//!         .from_new()
//!         .as_cached()
//!         .finish()?;
//!     container.bind::<Greeter>().finish()?;
//!
//!     let greeter = container.resolve::<Greeter>()?;
//!     assert_eq!(greeter.logger.log("hi"), "[console] hi");
//!     Ok(())
//! }
//! ```

mod binding;
mod container;
mod context;
mod core;
mod error;
mod factory;
mod global;
mod inject;
mod lazy;
mod macros;
pub mod provider;
mod settings;
mod validate;

pub use binding::{
  BindInfo, Caster, ConcreteBinder, Condition, ConditionBinder, Contract, CopyMode,
  FactoryBindInfo, FactoryConditionBinder, FactoryFromBinder, FactoryToBinder, FromBinder,
  InstantiatedCallback, ProviderFactory, Scope, ScopeConditionBinder,
};
pub use container::{Container, WeakContainer};
pub use context::{InjectContext, InjectSources};
pub use crate::core::{BindingKey, ContractType, Identifier, Instance, TypedArg};
pub use error::{Error, Result};
pub use factory::{Factory, PlaceholderFactory};
pub use global::project;
pub use inject::{Injectable, InjectableMember, Injector};
pub use lazy::Lazy;
pub use provider::{Provider, ProviderKind};
pub use settings::{ContainerSettings, RootResolveMethod, ValidationErrorResponse};
