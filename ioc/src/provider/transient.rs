use super::{notify_instantiated, Provider, ProviderKind};
use crate::binding::{BindInfo, InstantiatedCallback};
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Instance, TypedArg};
use crate::error::Result;
use crate::inject::{Injectable, InjectableMember, Injector};
use std::marker::PhantomData;
use std::sync::Arc;

/// Builds a new `C` on every call, resolving its members through the container.
pub struct TransientProvider<C> {
  arguments: Vec<TypedArg>,
  instantiated: Option<InstantiatedCallback>,
  _concrete: PhantomData<fn() -> C>,
}

impl<C: Injectable> TransientProvider<C> {
  pub fn new(arguments: Vec<TypedArg>, instantiated: Option<InstantiatedCallback>) -> Self {
    Self {
      arguments,
      instantiated,
      _concrete: PhantomData,
    }
  }

  pub fn from_bind_info(info: &BindInfo) -> Self {
    Self::new(
      info.arguments().to_vec(),
      info.instantiated_callback().cloned(),
    )
  }
}

impl<C: Injectable> Provider for TransientProvider<C> {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Transient
  }

  fn instance_type(&self) -> Option<ContractType> {
    Some(ContractType::of::<C>())
  }

  fn dependencies(&self) -> Vec<InjectableMember> {
    C::dependencies()
  }

  fn dependency_owner(&self) -> Option<ContractType> {
    Some(ContractType::of::<C>())
  }

  fn provide(
    &self,
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    let mut arguments = self.arguments.clone();
    arguments.extend(args);

    let value = Injector::construct::<C>(container, context, arguments)?;
    let instance = Instance::new(Arc::new(value));
    notify_instantiated(self.instantiated.as_ref(), context, &instance);
    Ok(instance)
  }
}
