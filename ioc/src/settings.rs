//! Container settings, loadable from YAML.
//!
//! ```yaml
//! validation:
//!   error_response: fail        # log | fail
//!   root_resolve_method: all    # non_lazy_only | all
//! max_resolve_depth: 64
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

/// What `Container::validate` does with the problems it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorResponse {
  /// Report each problem through `tracing` and succeed.
  #[default]
  Log,
  /// Return every problem in an [`Error::Validation`].
  Fail,
}

/// Which bindings `Container::validate` starts walking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootResolveMethod {
  #[default]
  NonLazyOnly,
  All,
}

const DEFAULT_MAX_RESOLVE_DEPTH: usize = 128;

fn default_max_resolve_depth() -> usize {
  DEFAULT_MAX_RESOLVE_DEPTH
}

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
struct ValidationSettingsRaw {
  #[serde(default)]
  error_response: ValidationErrorResponse,
  #[serde(default)]
  root_resolve_method: RootResolveMethod,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ContainerSettingsRaw {
  #[serde(default)]
  validation: ValidationSettingsRaw,
  #[serde(default = "default_max_resolve_depth")]
  max_resolve_depth: usize,
}

impl Default for ContainerSettingsRaw {
  fn default() -> Self {
    Self {
      validation: ValidationSettingsRaw::default(),
      max_resolve_depth: DEFAULT_MAX_RESOLVE_DEPTH,
    }
  }
}

/// Validated settings shared by a container and all of its sub-containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSettings {
  validation_error_response: ValidationErrorResponse,
  root_resolve_method: RootResolveMethod,
  max_resolve_depth: NonZeroUsize,
}

impl Default for ContainerSettings {
  fn default() -> Self {
    Self {
      validation_error_response: ValidationErrorResponse::default(),
      root_resolve_method: RootResolveMethod::default(),
      max_resolve_depth: NonZeroUsize::MIN.saturating_add(DEFAULT_MAX_RESOLVE_DEPTH - 1),
    }
  }
}

impl ContainerSettings {
  /// Parses settings from a YAML document. An empty document yields the defaults.
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    if yaml.trim().is_empty() {
      return Ok(Self::default());
    }
    let raw: ContainerSettingsRaw =
      serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_raw(raw)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() == 0 {
      return Ok(Self::default());
    }
    let raw: ContainerSettingsRaw = serde_yaml::from_reader(BufReader::new(file))
      .map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_raw(raw)
  }

  fn from_raw(raw: ContainerSettingsRaw) -> Result<Self> {
    let max_resolve_depth =
      NonZeroUsize::new(raw.max_resolve_depth).ok_or_else(|| Error::InvalidSettings {
        field: "max_resolve_depth".to_string(),
        message: "must be greater than zero".to_string(),
      })?;
    Ok(Self {
      validation_error_response: raw.validation.error_response,
      root_resolve_method: raw.validation.root_resolve_method,
      max_resolve_depth,
    })
  }

  pub fn with_validation_error_response(mut self, response: ValidationErrorResponse) -> Self {
    self.validation_error_response = response;
    self
  }

  pub fn with_root_resolve_method(mut self, method: RootResolveMethod) -> Self {
    self.root_resolve_method = method;
    self
  }

  pub fn with_max_resolve_depth(mut self, depth: NonZeroUsize) -> Self {
    self.max_resolve_depth = depth;
    self
  }

  pub fn validation_error_response(&self) -> ValidationErrorResponse {
    self.validation_error_response
  }

  pub fn root_resolve_method(&self) -> RootResolveMethod {
    self.root_resolve_method
  }

  /// The longest resolution chain allowed before resolving fails.
  pub fn max_resolve_depth(&self) -> usize {
    self.max_resolve_depth.get()
  }
}
