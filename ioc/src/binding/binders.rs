use super::bind_info::{BindInfo, Contract, FactoryBindInfo, ProviderFactory, Scope};
use crate::container::Container;
use crate::context::{InjectContext, InjectSources};
use crate::core::{ContractType, Identifier, Instance};
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::inject::Injectable;
use crate::provider::{
  CustomProvider, FactoryProvider, InstanceProvider, Method, MethodProvider, Provider,
  ResolveProvider, TransientProvider,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Only `from_new` bindings consume binding-level arguments.
fn forbid_arguments(info: &BindInfo) -> Result<()> {
  if info.arguments().is_empty() {
    Ok(())
  } else {
    Err(Error::invalid_binding(
      info.describe_contracts(),
      "with_arguments is only supported by from_new bindings",
    ))
  }
}

/// Providers that hand out instances created elsewhere never report instantiation.
fn forbid_callback(info: &BindInfo, source: &str) -> Result<()> {
  match info.instantiated_callback() {
    None => Ok(()),
    Some(_) => Err(Error::invalid_binding(
      info.describe_contracts(),
      format!("on_instantiated is not supported by {} bindings", source),
    )),
  }
}

pub(crate) fn new_provider<C: Injectable>() -> ProviderFactory {
  Arc::new(|_: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(TransientProvider::<C>::from_bind_info(info)))
  })
}

pub(crate) fn shared_provider<C: ?Sized + Send + Sync + 'static>(
  instance: Arc<C>,
) -> ProviderFactory {
  Arc::new(move |_: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    forbid_arguments(info)?;
    forbid_callback(info, "from_instance")?;
    Ok(Arc::new(InstanceProvider::new(Instance::new(instance.clone()))))
  })
}

pub(crate) fn method_provider<C: ?Sized + Send + Sync + 'static>(
  method: impl Fn(&InjectContext<'_>) -> Result<Arc<C>> + Send + Sync + 'static,
) -> ProviderFactory {
  let method: Arc<Method<C>> = Arc::new(method);
  Arc::new(move |_: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    forbid_arguments(info)?;
    Ok(Arc::new(MethodProvider::<C>::new(
      method.clone(),
      info.instantiated_callback().cloned(),
    )))
  })
}

pub(crate) fn resolve_provider<C: ?Sized + 'static>(
  identifier: Option<Identifier>,
  source: InjectSources,
) -> ProviderFactory {
  Arc::new(move |_: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    forbid_arguments(info)?;
    forbid_callback(info, "from_resolve")?;
    Ok(Arc::new(ResolveProvider::new(
      ContractType::of::<C>(),
      identifier.clone(),
      source,
    )))
  })
}

pub(crate) fn factory_provider<F, C>() -> ProviderFactory
where
  F: Factory<C> + Injectable,
  C: ?Sized + Send + Sync + 'static,
{
  Arc::new(|container: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    forbid_arguments(info)?;
    let factory_id = Identifier::unique();
    container
      .bind::<F>()
      .with_id(factory_id.clone())
      .from_new()
      .as_cached()
      .finish()?;
    Ok(Arc::new(FactoryProvider::<F, C>::new(
      factory_id,
      info.instantiated_callback().cloned(),
    )))
  })
}

pub(crate) fn custom_provider(provider: Arc<dyn Provider>) -> ProviderFactory {
  Arc::new(move |_: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
    forbid_arguments(info)?;
    Ok(Arc::new(CustomProvider::new(
      provider.clone(),
      info.instantiated_callback().cloned(),
    )))
  })
}

/// Options shared by every binder stage after a provider has been chosen.
macro_rules! condition_options {
  ($binder:ident) => {
    impl<'c, T, C> $binder<'c, T, C>
    where
      T: ?Sized + Send + Sync + 'static,
      C: ?Sized + Send + Sync + 'static,
    {
      pub fn with_id(mut self, identifier: impl Into<$crate::core::Identifier>) -> Self {
        self.info.set_identifier(Some(identifier.into()));
        self
      }

      /// Distinguishes `Single` instances of the same concrete type.
      pub fn with_concrete_id(mut self, identifier: impl Into<$crate::core::Identifier>) -> Self {
        self.info.set_concrete_identifier(Some(identifier.into()));
        self
      }

      /// Arguments handed to the constructor ahead of container lookups.
      pub fn with_arguments(
        mut self,
        arguments: impl IntoIterator<Item = $crate::core::TypedArg>,
      ) -> Self {
        self.info.set_arguments(arguments.into_iter().collect());
        self
      }

      /// Restricts the binding to requests for which `condition` holds.
      pub fn when(
        mut self,
        condition: impl Fn(&$crate::context::InjectContext<'_>) -> bool + Send + Sync + 'static,
      ) -> Self {
        self.info.set_condition(std::sync::Arc::new(condition));
        self
      }

      /// Serves only members of instances of type `U`.
      pub fn when_injected_into<U: ?Sized + 'static>(self) -> Self {
        let target = $crate::core::ContractType::of::<U>();
        self.when(move |ctx| ctx.object_type() == Some(target))
      }

      pub fn when_not_injected_into<U: ?Sized + 'static>(self) -> Self {
        let target = $crate::core::ContractType::of::<U>();
        self.when(move |ctx| ctx.object_type() != Some(target))
      }

      pub fn copy_into_direct_sub_containers(mut self) -> Self {
        self.info.set_copy_mode($crate::binding::CopyMode::DirectSubContainers);
        self
      }

      pub fn copy_into_all_sub_containers(mut self) -> Self {
        self.info.set_copy_mode($crate::binding::CopyMode::AllSubContainers);
        self
      }

      /// Marks the binding as a root for `Container::resolve_roots`.
      pub fn non_lazy(mut self) -> Self {
        self.info.set_non_lazy(true);
        self
      }

      /// Runs `callback` on every instance this binding creates.
      pub fn on_instantiated(
        mut self,
        callback: impl Fn(&$crate::context::InjectContext<'_>, &std::sync::Arc<C>)
          + Send
          + Sync
          + 'static,
      ) -> Self {
        self.info.set_instantiated_callback(std::sync::Arc::new(
          move |ctx: &$crate::context::InjectContext<'_>, instance: &$crate::core::Instance| {
            if let Some(value) = instance.downcast::<C>() {
              callback(ctx, &value);
            }
          },
        ));
        self
      }

      /// Registers the binding with the container.
      pub fn finish(self) -> $crate::error::Result<()> {
        self.container.register(self.info, self.factory)
      }
    }
  };
}

pub(crate) use condition_options;

/// The first stage of a binding: the contract is known, the concrete type is not.
#[must_use = "a binding is only registered by `finish()`"]
pub struct ConcreteBinder<'c, T: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  _contract: PhantomData<fn() -> Box<T>>,
}

impl<'c, T: ?Sized + Send + Sync + 'static> ConcreteBinder<'c, T> {
  pub(crate) fn new(container: &'c Container) -> Self {
    Self {
      container,
      info: BindInfo::new(Contract::of::<T>()),
      _contract: PhantomData,
    }
  }

  pub fn with_id(mut self, identifier: impl Into<Identifier>) -> Self {
    self.info.set_identifier(Some(identifier.into()));
    self
  }

  /// Serves the contract with instances of `C`, converted by `cast` (usually `|c| c`).
  pub fn to<C: ?Sized + Send + Sync + 'static>(
    mut self,
    cast: impl Fn(Arc<C>) -> Arc<T> + Send + Sync + 'static,
  ) -> FromBinder<'c, T, C> {
    self.info.set_primary_contract(Contract::with_cast::<C, T>(cast));
    self.info.set_concrete_type(ContractType::of::<C>());
    FromBinder::new(self.container, self.info)
  }

  pub fn to_self(mut self) -> FromBinder<'c, T, T> {
    self.info.set_concrete_type(ContractType::of::<T>());
    FromBinder::new(self.container, self.info)
  }

  pub fn from_shared(self, instance: Arc<T>) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_shared(instance)
  }

  pub fn from_method(
    self,
    method: impl Fn(&InjectContext<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
  ) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_method(method)
  }

  /// Serves the contract by resolving the same contract again; only useful with an
  /// identifier or a narrower source.
  pub fn from_resolve(self) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_resolve()
  }

  pub fn from_resolve_id(self, identifier: impl Into<Identifier>) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_resolve_id(identifier)
  }

  pub fn from_provider(self, provider: Arc<dyn Provider>) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_provider(provider)
  }
}

impl<'c, T: Send + Sync + 'static> ConcreteBinder<'c, T> {
  pub fn from_instance(self, instance: T) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_instance(instance)
  }
}

impl<'c, T: Injectable> ConcreteBinder<'c, T> {
  pub fn from_new(self) -> ScopeConditionBinder<'c, T, T> {
    self.to_self().from_new()
  }

  /// Registers `T` built by the container, transient.
  pub fn finish(self) -> Result<()> {
    self.from_new().finish()
  }
}

/// The concrete type is chosen; the next call decides how instances are produced.
#[must_use = "a binding is only registered by `finish()`"]
pub struct FromBinder<'c, T: ?Sized, C: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  factory: FactoryBindInfo,
  _types: PhantomData<fn() -> (Box<T>, Box<C>)>,
}

impl<'c, T, C> FromBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: ?Sized + Send + Sync + 'static,
{
  fn new(container: &'c Container, info: BindInfo) -> Self {
    Self {
      container,
      info,
      factory: FactoryBindInfo::new(),
      _types: PhantomData,
    }
  }

  pub fn with_id(mut self, identifier: impl Into<Identifier>) -> Self {
    self.info.set_identifier(Some(identifier.into()));
    self
  }

  /// Registers the same instances under a further contract `U`.
  pub fn also_as<U: ?Sized + Send + Sync + 'static>(
    mut self,
    cast: impl Fn(Arc<C>) -> Arc<U> + Send + Sync + 'static,
  ) -> Self {
    self.info.add_contract(Contract::with_cast::<C, U>(cast));
    self
  }

  pub fn from_shared(mut self, instance: Arc<C>) -> ScopeConditionBinder<'c, T, C> {
    self.factory.set_provider_factory(shared_provider(instance));
    self.scope()
  }

  /// Produces instances with `method`, which receives the request being served.
  pub fn from_method(
    mut self,
    method: impl Fn(&InjectContext<'_>) -> Result<Arc<C>> + Send + Sync + 'static,
  ) -> ScopeConditionBinder<'c, T, C> {
    self.factory.set_provider_factory(method_provider(method));
    self.scope()
  }

  /// Produces instances by resolving `C` from the container.
  pub fn from_resolve(self) -> ScopeConditionBinder<'c, T, C> {
    self.from_resolve_with(None, InjectSources::Any)
  }

  pub fn from_resolve_id(self, identifier: impl Into<Identifier>) -> ScopeConditionBinder<'c, T, C> {
    self.from_resolve_with(Some(identifier.into()), InjectSources::Any)
  }

  pub fn from_resolve_with(
    mut self,
    identifier: Option<Identifier>,
    source: InjectSources,
  ) -> ScopeConditionBinder<'c, T, C> {
    self
      .factory
      .set_provider_factory(resolve_provider::<C>(identifier, source));
    self.scope()
  }

  /// Produces instances through the factory `F`, which the container builds and
  /// keeps under a hidden identifier.
  pub fn from_factory<F>(mut self) -> ScopeConditionBinder<'c, T, C>
  where
    F: Factory<C> + Injectable,
  {
    self.factory.set_provider_factory(factory_provider::<F, C>());
    self.scope()
  }

  /// Uses a custom provider; it is shared by every copy of the binding.
  pub fn from_provider(mut self, provider: Arc<dyn Provider>) -> ScopeConditionBinder<'c, T, C> {
    self.factory.set_provider_factory(custom_provider(provider));
    self.scope()
  }

  fn scope(self) -> ScopeConditionBinder<'c, T, C> {
    ScopeConditionBinder {
      container: self.container,
      info: self.info,
      factory: self.factory,
      _types: PhantomData,
    }
  }
}

impl<'c, T, C> FromBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: Send + Sync + 'static,
{
  pub fn from_instance(self, instance: C) -> ScopeConditionBinder<'c, T, C> {
    self.from_shared(Arc::new(instance))
  }
}

impl<'c, T, C> FromBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: Injectable,
{
  /// Builds instances with [`Injectable::construct`].
  pub fn from_new(mut self) -> ScopeConditionBinder<'c, T, C> {
    self.factory.set_provider_factory(new_provider::<C>());
    self.scope()
  }

  pub fn finish(self) -> Result<()> {
    self.from_new().finish()
  }
}

/// The provider is chosen; the lifetime may still be set.
#[must_use = "a binding is only registered by `finish()`"]
pub struct ScopeConditionBinder<'c, T: ?Sized, C: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  factory: FactoryBindInfo,
  _types: PhantomData<fn() -> (Box<T>, Box<C>)>,
}

impl<'c, T, C> ScopeConditionBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: ?Sized + Send + Sync + 'static,
{
  pub fn as_transient(self) -> ConditionBinder<'c, T, C> {
    self.with_scope(Scope::Transient)
  }

  pub fn as_cached(self) -> ConditionBinder<'c, T, C> {
    self.with_scope(Scope::Cached)
  }

  pub fn as_single(self) -> ConditionBinder<'c, T, C> {
    self.with_scope(Scope::Single)
  }

  fn with_scope(mut self, scope: Scope) -> ConditionBinder<'c, T, C> {
    self.info.set_scope(scope);
    ConditionBinder {
      container: self.container,
      info: self.info,
      factory: self.factory,
      _types: PhantomData,
    }
  }
}

condition_options!(ScopeConditionBinder);

/// The last stage: conditions, arguments, copy and laziness options.
#[must_use = "a binding is only registered by `finish()`"]
pub struct ConditionBinder<'c, T: ?Sized, C: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  factory: FactoryBindInfo,
  _types: PhantomData<fn() -> (Box<T>, Box<C>)>,
}

condition_options!(ConditionBinder);
