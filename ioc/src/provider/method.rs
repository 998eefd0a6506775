use super::{notify_instantiated, reject_arguments, Provider, ProviderKind};
use crate::binding::InstantiatedCallback;
use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Instance, TypedArg};
use crate::error::Result;
use std::sync::Arc;

pub type Method<C> = dyn Fn(&InjectContext<'_>) -> Result<Arc<C>> + Send + Sync;

/// Delegates creation to a user closure that receives the request's context.
pub struct MethodProvider<C: ?Sized> {
  method: Arc<Method<C>>,
  instantiated: Option<InstantiatedCallback>,
}

impl<C: ?Sized + Send + Sync + 'static> MethodProvider<C> {
  pub fn new(method: Arc<Method<C>>, instantiated: Option<InstantiatedCallback>) -> Self {
    Self {
      method,
      instantiated,
    }
  }
}

impl<C: ?Sized + Send + Sync + 'static> Provider for MethodProvider<C> {
  fn kind(&self) -> ProviderKind {
    ProviderKind::Method
  }

  fn instance_type(&self) -> Option<ContractType> {
    Some(ContractType::of::<C>())
  }

  fn provide(
    &self,
    _container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<Instance> {
    reject_arguments(ContractType::of::<C>(), &args)?;
    let instance = Instance::new((self.method)(context)?);
    notify_instantiated(self.instantiated.as_ref(), context, &instance);
    Ok(instance)
  }
}
