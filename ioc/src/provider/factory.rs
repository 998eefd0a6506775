use super::{notify_instantiated, reject_arguments, Provider, ProviderKind};
use crate::binding::InstantiatedCallback;
use crate::container::Container;
use crate::context::{InjectContext, InjectSources};
use crate::core::{BindingKey, ContractType, Identifier, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::inject::InjectableMember;
use std::marker::PhantomData;

/// Creates instances through a user factory `F` bound under a hidden identifier.
pub struct FactoryProvider<F, C: ?Sized> {
  factory_id: Identifier,
  instantiated: Option<InstantiatedCallback>,
  _types: PhantomData<fn() -> (Box<F>, Box<C>)>,
}

impl<F, C> FactoryProvider<F, C>
where
  F: Factory<C>,
  C: ?Sized + Send + Sync + 'static,
{
  pub fn new(factory_id: Identifier, instantiated: Option<InstantiatedCallback>) -> Self {
    Self {
      factory_id,
      instantiated,
      _types: PhantomData,
    }
  }
}

impl<F, C> Provider for FactoryProvider<F, C>
where
  F: Factory<C>,
  C: ?Sized + Send + Sync + 'static,
{
  fn kind(&self) -> ProviderKind {
    ProviderKind::Factory
  }

  fn instance_type(&self) -> Option<ContractType> {
    Some(ContractType::of::<C>())
  }

  fn dependencies(&self) -> Vec<InjectableMember> {
    vec![InjectableMember::of::<F>("<factory>")
      .with_id(self.factory_id.clone())
      .from_source(InjectSources::Local)]
  }

  fn provide(
    &self,
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    reject_arguments(ContractType::of::<C>(), &args)?;
    let request = context
      .push(ContractType::of::<F>(), Some(self.factory_id.clone()))
      .with_source(InjectSources::Local);

    let factory = container
      .resolve_context(&request)?
      .ok_or_else(|| Error::NotFound {
        key: BindingKey::new(ContractType::of::<F>(), Some(self.factory_id.clone())),
        chain: request.describe_chain(),
      })?
      .expect_type::<F>()?;

    let instance = Instance::new(factory.create()?);
    notify_instantiated(self.instantiated.as_ref(), context, &instance);
    Ok(instance)
  }
}
