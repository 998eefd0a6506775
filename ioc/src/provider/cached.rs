use super::{Provider, ProviderKind};
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, CreationGuard, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::inject::InjectableMember;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Wraps another provider and keeps the first instance it produces.
///
/// The slot is written once; a failed creation leaves it empty so a later call can retry.
pub struct CachedProvider {
  inner: Arc<dyn Provider>,
  slot: OnceCell<Instance>,
}

impl CachedProvider {
  pub fn new(inner: Arc<dyn Provider>) -> Self {
    Self {
      inner,
      slot: OnceCell::new(),
    }
  }
}

impl Provider for CachedProvider {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Cached
  }

  fn instance_type(&self) -> Option<ContractType> {
    self.inner.instance_type()
  }

  fn is_cached(&self) -> bool {
    true
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
    if let Some(instance) = self.slot.get() {
      return Ok(instance.clone());
    }

    let _guard = CreationGuard::enter(self as *const Self as usize).ok_or_else(|| {
      Error::CircularDependency {
        chain: format!(
          "{} (re-entered while its cached instance was being created)",
          context.describe_chain()
        ),
      }
    })?;

    self
      .slot
      .get_or_try_init(|| self.inner.provide(container, context, args))
      .cloned()
  }
}
