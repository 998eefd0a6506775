//! Factories: objects that create instances on demand instead of at injection time.

use crate::binding::Contract;
use crate::container::WeakContainer;
use crate::context::InjectContext;
use crate::core::TypedArg;
use crate::error::{Error, Result};
use crate::provider::Provider;
use std::marker::PhantomData;
use std::sync::Arc;

/// A user-defined factory, bound with `from_factory`.
pub trait Factory<T: ?Sized>: Send + Sync + 'static {
  fn create(&self) -> Result<Arc<T>>;
}

/// The factory produced by `Container::bind_factory`.
///
/// Creation goes through the provider configured on the factory binding, starting a
/// fresh resolution chain on every call.
pub struct PlaceholderFactory<T: ?Sized> {
  container: WeakContainer,
  product: Arc<dyn Provider>,
  contract: Contract,
  _product: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> PlaceholderFactory<T> {
  pub(crate) fn new(container: WeakContainer, product: Arc<dyn Provider>, contract: Contract) -> Self {
    Self {
      container,
      product,
      contract,
      _product: PhantomData,
    }
  }

  pub fn create(&self) -> Result<Arc<T>> {
    self.create_with(Vec::new())
  }

  /// Creates a product, handing `args` to its construction ahead of container lookups.
  pub fn create_with(&self, args: Vec<TypedArg>) -> Result<Arc<T>> {
    let container = self.container.upgrade().ok_or(Error::ContainerDisposed)?;
    let context = InjectContext::of::<T>(&container);
    let instance = self.product.provide(&container, &context, args)?;
    self.contract.apply(instance)?.expect_type::<T>()
  }
}

impl<T: ?Sized + Send + Sync + 'static> Factory<T> for PlaceholderFactory<T> {
  fn create(&self) -> Result<Arc<T>> {
    PlaceholderFactory::create(self)
  }
}
