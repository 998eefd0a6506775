use super::{reject_arguments, Provider, ProviderKind};
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Instance, TypedArg};
use crate::error::Result;

/// Hands out a value that existed before the binding was made.
pub struct InstanceProvider {
  instance: Instance,
}

impl InstanceProvider {
  pub fn new(instance: Instance) -> Self {
    Self { instance }
  }
}

impl Provider for InstanceProvider {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Instance
  }

  fn instance_type(&self) -> Option<ContractType> {
    Some(self.instance.type_info())
  }

  fn is_cached(&self) -> bool {
    true
  }

  fn provide(
    &self,
    _container: &Container,
    _context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    reject_arguments(self.instance.type_info(), &args)?;
    Ok(self.instance.clone())
  }
}
