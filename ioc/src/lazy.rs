//! Deferred resolution.

use crate::container::WeakContainer;
use crate::core::{CreationGuard, Identifier};
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// A dependency that is resolved on first use rather than when its owner is built.
///
/// The first [`Lazy::get`] starts a fresh resolution chain, so a lazy member is the
/// usual way to break a construction cycle. The result is kept for later calls.
pub struct Lazy<T: ?Sized> {
  container: WeakContainer,
  identifier: Option<Identifier>,
  value: OnceCell<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Lazy<T> {
  pub(crate) fn new(container: WeakContainer, identifier: Option<Identifier>) -> Self {
    Self {
      container,
      identifier,
      value: OnceCell::new(),
    }
  }

  pub fn get(&self) -> Result<Arc<T>> {
    if let Some(value) = self.value.get() {
      return Ok(value.clone());
    }

    let _guard =
      CreationGuard::enter(self as *const Self as usize).ok_or_else(|| {
        Error::CircularDependency {
          chain: format!(
            "{} (lazy value requested while it was being resolved)",
            std::any::type_name::<T>()
          ),
        }
      })?;

    self
      .value
      .get_or_try_init(|| {
        let container = self.container.upgrade().ok_or(Error::ContainerDisposed)?;
        container.resolve_with_identifier::<T>(self.identifier.clone())
      })
      .cloned()
  }

  pub fn is_resolved(&self) -> bool {
    self.value.get().is_some()
  }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Lazy")
      .field("contract", &std::any::type_name::<T>())
      .field("identifier", &self.identifier)
      .field("resolved", &self.value.get().is_some())
      .finish()
  }
}
