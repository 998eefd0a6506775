//! The error type shared by binding, resolution and settings operations.

use crate::core::{BindingKey, ContractType};
use std::fmt::Display;
use thiserror::Error;

/// The main error type for the `zenject` library.
///
/// Configuration errors surface when a binding is finished; resolution errors surface
/// from the resolve call that triggered them and never alter the container's registry.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid binding for '{contract}': {message}")]
  InvalidConfiguration { contract: String, message: String },

  #[error("Unable to resolve '{key}' ({chain})")]
  NotFound { key: BindingKey, chain: String },

  #[error("Found {matches} bindings for '{key}' where exactly one was expected ({chain})")]
  Ambiguous {
    key: BindingKey,
    matches: usize,
    chain: String,
  },

  #[error("Circular dependency detected: {chain}")]
  CircularDependency { chain: String },

  #[error("Resolution exceeded the maximum depth of {max_depth}: {chain}")]
  DepthExceeded { max_depth: usize, chain: String },

  #[error("Expected an instance of '{expected}' but the provider produced '{actual}'")]
  TypeMismatch {
    expected: ContractType,
    actual: ContractType,
  },

  #[error("Passed unused arguments when constructing '{concrete}': {arguments}")]
  UnusedArguments {
    concrete: ContractType,
    arguments: String,
  },

  #[error("Failed to construct '{contract}': {reason}")]
  Construction { contract: String, reason: String },

  #[error("The container behind this handle has been dropped")]
  ContainerDisposed,

  #[error("Validation found {} problem(s):\n{}", .0.len(), list(.0))]
  Validation(Vec<Error>),

  #[error("Failed to read settings file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse settings: {0}")]
  ConfigParse(String),

  #[error("Invalid settings value for '{field}': {message}")]
  InvalidSettings { field: String, message: String },
}

impl Error {
  /// Builds a [`Error::Construction`] for a user factory that failed to produce `T`.
  pub fn construction<T: ?Sized + 'static>(reason: impl Display) -> Self {
    Error::Construction {
      contract: ContractType::of::<T>().to_string(),
      reason: reason.to_string(),
    }
  }

  pub(crate) fn invalid_binding(contract: impl Display, message: impl Into<String>) -> Self {
    Error::InvalidConfiguration {
      contract: contract.to_string(),
      message: message.into(),
    }
  }

  /// Whether this error means "nothing was bound", as opposed to a broken binding.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound { .. })
  }
}

fn list(errors: &[Error]) -> String {
  errors
    .iter()
    .map(|e| format!("  - {}", e))
    .collect::<Vec<_>>()
    .join("\n")
}

/// A specialized `Result` type for `zenject` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
