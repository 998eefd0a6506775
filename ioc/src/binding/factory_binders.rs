use super::bind_info::{BindInfo, Contract, FactoryBindInfo, ProviderFactory, Scope};
use super::binders::{
  condition_options, custom_provider, factory_provider, method_provider, new_provider,
  resolve_provider,
};
use crate::container::Container;
use crate::context::{InjectContext, InjectSources};
use crate::core::{ContractType, Identifier, Instance};
use crate::error::Result;
use crate::factory::{Factory, PlaceholderFactory};
use crate::inject::Injectable;
use crate::provider::{InstanceProvider, Provider};
use std::marker::PhantomData;
use std::sync::Arc;

/// Wraps the product's provider factory into one that registers a [`PlaceholderFactory`].
///
/// The binding scope is applied to the product provider, so `as_cached` makes every
/// `create` call on the factory hand out the same product.
fn placeholder_provider<T: ?Sized + Send + Sync + 'static>(
  product: ProviderFactory,
  contract: Contract,
) -> ProviderFactory {
  Arc::new(
    move |container: &Container, info: &BindInfo| -> Result<Arc<dyn Provider>> {
      let provider = container.apply_scope(info, product(container, info)?, &product)?;
      let factory = Arc::new(PlaceholderFactory::<T>::new(
        container.downgrade(),
        provider,
        contract.clone(),
      ));
      Ok(Arc::new(InstanceProvider::new(Instance::new(factory))))
    },
  )
}

/// The first stage of `Container::bind_factory::<T>()`.
#[must_use = "a binding is only registered by `finish()`"]
pub struct FactoryToBinder<'c, T: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  _product: PhantomData<fn() -> Box<T>>,
}

impl<'c, T: ?Sized + Send + Sync + 'static> FactoryToBinder<'c, T> {
  pub(crate) fn new(container: &'c Container) -> Self {
    Self {
      container,
      info: BindInfo::new(Contract::of::<PlaceholderFactory<T>>()),
      _product: PhantomData,
    }
  }

  pub fn with_id(mut self, identifier: impl Into<Identifier>) -> Self {
    self.info.set_identifier(Some(identifier.into()));
    self
  }

  /// Products are instances of `C`, converted to `T` by `cast`.
  pub fn to<C: ?Sized + Send + Sync + 'static>(
    mut self,
    cast: impl Fn(Arc<C>) -> Arc<T> + Send + Sync + 'static,
  ) -> FactoryFromBinder<'c, T, C> {
    self.info.set_concrete_type(ContractType::of::<C>());
    FactoryFromBinder::new(self.container, self.info, Contract::with_cast::<C, T>(cast))
  }

  pub fn to_self(mut self) -> FactoryFromBinder<'c, T, T> {
    self.info.set_concrete_type(ContractType::of::<T>());
    FactoryFromBinder::new(self.container, self.info, Contract::of::<T>())
  }

  pub fn from_method(
    self,
    method: impl Fn(&InjectContext<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
  ) -> FactoryConditionBinder<'c, T, T> {
    self.to_self().from_method(method)
  }

  pub fn from_resolve_id(
    self,
    identifier: impl Into<Identifier>,
  ) -> FactoryConditionBinder<'c, T, T> {
    self.to_self().from_resolve_id(identifier)
  }
}

impl<'c, T: Injectable> FactoryToBinder<'c, T> {
  pub fn from_new(self) -> FactoryConditionBinder<'c, T, T> {
    self.to_self().from_new()
  }

  /// Registers a factory that builds `T` with the container.
  pub fn finish(self) -> Result<()> {
    self.from_new().finish()
  }
}

/// Chooses how the factory's products are created.
#[must_use = "a binding is only registered by `finish()`"]
pub struct FactoryFromBinder<'c, T: ?Sized, C: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  product: Contract,
  _types: PhantomData<fn() -> (Box<T>, Box<C>)>,
}

impl<'c, T, C> FactoryFromBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: ?Sized + Send + Sync + 'static,
{
  fn new(container: &'c Container, info: BindInfo, product: Contract) -> Self {
    Self {
      container,
      info,
      product,
      _types: PhantomData,
    }
  }

  pub fn from_method(
    self,
    method: impl Fn(&InjectContext<'_>) -> Result<Arc<C>> + Send + Sync + 'static,
  ) -> FactoryConditionBinder<'c, T, C> {
    self.with_product(method_provider(method))
  }

  /// Every product is resolved from the container.
  pub fn from_resolve(self) -> FactoryConditionBinder<'c, T, C> {
    self.with_product(resolve_provider::<C>(None, InjectSources::Any))
  }

  pub fn from_resolve_id(
    self,
    identifier: impl Into<Identifier>,
  ) -> FactoryConditionBinder<'c, T, C> {
    self.with_product(resolve_provider::<C>(
      Some(identifier.into()),
      InjectSources::Any,
    ))
  }

  /// Products come from a user factory `F`.
  pub fn from_factory<F>(self) -> FactoryConditionBinder<'c, T, C>
  where
    F: Factory<C> + Injectable,
  {
    self.with_product(factory_provider::<F, C>())
  }

  pub fn from_provider(self, provider: Arc<dyn Provider>) -> FactoryConditionBinder<'c, T, C> {
    self.with_product(custom_provider(provider))
  }

  fn with_product(self, product: ProviderFactory) -> FactoryConditionBinder<'c, T, C> {
    let mut factory = FactoryBindInfo::new();
    factory.set_provider_factory(placeholder_provider::<T>(product, self.product));
    FactoryConditionBinder {
      container: self.container,
      info: self.info,
      factory,
      _types: PhantomData,
    }
  }
}

impl<'c, T, C> FactoryFromBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: Injectable,
{
  pub fn from_new(self) -> FactoryConditionBinder<'c, T, C> {
    self.with_product(new_provider::<C>())
  }

  pub fn finish(self) -> Result<()> {
    self.from_new().finish()
  }
}

/// Scope and condition options of a factory binding; the scope applies to the products.
#[must_use = "a binding is only registered by `finish()`"]
pub struct FactoryConditionBinder<'c, T: ?Sized, C: ?Sized> {
  container: &'c Container,
  info: BindInfo,
  factory: FactoryBindInfo,
  _types: PhantomData<fn() -> (Box<T>, Box<C>)>,
}

impl<'c, T, C> FactoryConditionBinder<'c, T, C>
where
  T: ?Sized + Send + Sync + 'static,
  C: ?Sized + Send + Sync + 'static,
{
  pub fn as_transient(mut self) -> Self {
    self.info.set_scope(Scope::Transient);
    self
  }

  pub fn as_cached(mut self) -> Self {
    self.info.set_scope(Scope::Cached);
    self
  }

  pub fn as_single(mut self) -> Self {
    self.info.set_scope(Scope::Single);
    self
  }
}

condition_options!(FactoryConditionBinder);
