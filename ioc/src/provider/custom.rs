use super::{notify_instantiated, Provider, ProviderKind};
use crate::binding::InstantiatedCallback;
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Instance, TypedArg};
use crate::error::Result;
use crate::inject::InjectableMember;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A user-supplied provider installed through `from_provider`.
///
/// Adds the binding's `on_instantiated` callback. A provider that caches its own
/// instance reports it once; any other provider reports every instance it returns.
pub(crate) struct CustomProvider {
  inner: Arc<dyn Provider>,
  instantiated: Option<InstantiatedCallback>,
  notified: AtomicBool,
}

impl CustomProvider {
  pub(crate) fn new(inner: Arc<dyn Provider>, instantiated: Option<InstantiatedCallback>) -> Self {
    Self {
      inner,
      instantiated,
      notified: AtomicBool::new(false),
    }
  }
}

impl Provider for CustomProvider {
  fn kind(&self) -> ProviderKind {
    self.inner.kind()
  }

  fn instance_type(&self) -> Option<ContractType> {
    self.inner.instance_type()
  }

  fn is_cached(&self) -> bool {
    self.inner.is_cached()
  }

  fn dependencies(&self) -> Vec<InjectableMember> {
    self.inner.dependencies()
  }

  fn dependency_owner(&self) -> Option<ContractType> {
    self.inner.dependency_owner()
  }

  fn provide(
    &self,
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    let instance = self.inner.provide(container, context, args)?;
    if !self.inner.is_cached() || !self.notified.swap(true, Ordering::AcqRel) {
      notify_instantiated(self.instantiated.as_ref(), context, &instance);
    }
    Ok(instance)
  }
}
