use super::{reject_arguments, Provider, ProviderKind};
use crate::container::Container;
use crate::context::{InjectContext, InjectSources};
use crate::core::{BindingKey, ContractType, Identifier, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::inject::InjectableMember;

/// Forwards a request to another binding: an alias.
pub struct ResolveProvider {
  contract: ContractType,
  identifier: Option<Identifier>,
  source: InjectSources,
}

impl ResolveProvider {
  pub fn new(contract: ContractType, identifier: Option<Identifier>, source: InjectSources) -> Self {
    Self {
      contract,
      identifier,
      source,
    }
  }
}

impl Provider for ResolveProvider {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Resolve
  }

  fn instance_type(&self) -> Option<ContractType> {
    Some(self.contract)
  }

  fn dependencies(&self) -> Vec<InjectableMember> {
    vec![InjectableMember::new("<resolve>", self.contract)
      .with_identifier(self.identifier.clone())
      .from_source(self.source)]
  }

  fn provide(
    &self,
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    reject_arguments(self.contract, &args)?;
    let request = context
      .push(self.contract, self.identifier.clone())
      .with_source(self.source);

    container
      .resolve_context(&request)?
      .ok_or_else(|| Error::NotFound {
        key: BindingKey::new(self.contract, self.identifier.clone()),
        chain: request.describe_chain(),
      })
  }
}
