//! The provider capability and its built-in variants.
//!
//! A provider turns a binding into instances. Containers never special-case a variant:
//! engine-side providers (scene objects, prefabs, asset references) implement
//! [`Provider`] and plug into a binding through `from_provider`.

mod cached;
mod custom;
mod factory;
mod instance;
mod method;
mod resolve;
mod transient;

pub use cached::CachedProvider;
pub(crate) use custom::CustomProvider;
pub use factory::FactoryProvider;
pub use instance::InstanceProvider;
pub use method::{Method, MethodProvider};
pub use resolve::ResolveProvider;
pub use transient::TransientProvider;

use crate::binding::InstantiatedCallback;
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::inject::InjectableMember;

/// The creation strategy behind a provider, used for logging and singleton conflict checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
  Transient,
  Cached,
  Instance,
  Method,
  Resolve,
  Factory,
  Custom(&'static str),
}

/// Produces instances for a binding.
///
/// Providers are shared by every consumer of their binding and must tolerate being
/// called any number of times. Cached variants hand out the same instance on every
/// call; creating variants build a fresh instance and resolve its dependencies anew.
pub trait Provider: Send + Sync {
  fn kind(&self) -> ProviderKind;

  /// The type of the instances this provider produces, when it is known up front.
  fn instance_type(&self) -> Option<ContractType> {
    None
  }

  fn is_cached(&self) -> bool {
    false
  }

  /// The members this provider will request while creating an instance, in order.
  fn dependencies(&self) -> Vec<InjectableMember> {
    Vec::new()
  }

  /// The object type recorded on the requests for [`Provider::dependencies`], which is
  /// what `when_injected_into` conditions see. `None` when the provider forwards
  /// requests without building an object of its own.
  fn dependency_owner(&self) -> Option<ContractType> {
    None
  }

  /// Produce an instance for `context`, resolving dependencies through `container`.
  fn provide(
    &self,
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance>;
}

pub(crate) fn notify_instantiated(
  callback: Option<&InstantiatedCallback>,
  context: &InjectContext<'_>,
  instance: &Instance,
) {
  if let Some(callback) = callback {
    callback(context, instance);
  }
}

/// Providers that cannot take construction arguments reject them instead of dropping them.
pub(crate) fn reject_arguments(concrete: ContractType, args: &[TypedArg]) -> Result<()> {
  if args.is_empty() {
    return Ok(());
  }
  Err(Error::UnusedArguments {
    concrete,
    arguments: args
      .iter()
      .map(|arg| arg.to_string())
      .collect::<Vec<_>>()
      .join(", "),
  })
}
