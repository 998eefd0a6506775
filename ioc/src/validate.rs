//! Dry-run validation of a container's object graph.

use crate::container::{select, Binding, Container};
use crate::context::InjectContext;
use crate::error::{Error, Result};
use crate::inject::InjectableMember;
use crate::settings::{RootResolveMethod, ValidationErrorResponse};
use std::sync::Arc;
use tracing::{debug, error};

impl Container {
  /// Walks the declared dependencies of the root bindings without building anything.
  ///
  /// Roots are the `non_lazy` bindings, or every binding when the settings ask for
  /// [`RootResolveMethod::All`]. With [`ValidationErrorResponse::Log`] each problem is
  /// logged and the call succeeds; with [`ValidationErrorResponse::Fail`] the problems
  /// are returned in an [`Error::Validation`].
  pub fn validate(&self) -> Result<()> {
    let errors = self.validation_errors();
    if errors.is_empty() {
      debug!("Container validation passed");
      return Ok(());
    }

    match self.settings().validation_error_response() {
      ValidationErrorResponse::Log => {
        for problem in &errors {
          error!(error = %problem, "Container validation failed");
        }
        Ok(())
      }
      ValidationErrorResponse::Fail => Err(Error::Validation(errors)),
    }
  }

  /// Every problem validation finds, regardless of the configured response.
  pub fn validation_errors(&self) -> Vec<Error> {
    let all = self.settings().root_resolve_method() == RootResolveMethod::All;
    let mut errors = Vec::new();

    for binding in self.installed() {
      if !all && !binding.info().is_non_lazy() {
        continue;
      }
      let Some(contract) = binding.info().contracts().first() else {
        continue;
      };
      let context = InjectContext::new(self, contract.contract_type())
        .with_identifier(binding.info().identifier().cloned());
      if let Err(e) = self.validate_binding(&binding, &context) {
        errors.push(e);
      }
    }
    errors
  }

  fn validate_binding(&self, binding: &Binding, context: &InjectContext<'_>) -> Result<()> {
    if context.is_serving(binding.id()) {
      return Err(Error::CircularDependency {
        chain: context.describe_chain(),
      });
    }
    let served = context.served_by(self, binding.id());
    let owner = binding.provider().dependency_owner();

    for member in binding.provider().dependencies() {
      // Lazy members start their own chain when used.
      if member.is_lazy() {
        continue;
      }
      let mut request = served
        .push(member.contract(), member.identifier().cloned())
        .with_optional(member.is_optional())
        .with_source(member.source());
      if let Some(owner) = owner {
        request = request.with_object_type(owner);
      }
      self.validate_member(&member, &request)?;
    }
    Ok(())
  }

  fn validate_member(&self, member: &InjectableMember, request: &InjectContext<'_>) -> Result<()> {
    self.check_depth(request)?;
    let key = request.key();

    if member.is_collection() {
      let mut found = false;
      for container in self.sources(request.source()) {
        for binding in container.matching(&key, request) {
          found = true;
          container.validate_binding(&binding, request)?;
        }
      }
      if !found && !member.is_optional() {
        return Err(Error::NotFound {
          key,
          chain: request.describe_chain(),
        });
      }
      return Ok(());
    }

    for container in self.sources(request.source()) {
      let matches: Vec<Arc<Binding>> = container.matching(&key, request);
      if matches.is_empty() {
        continue;
      }
      let binding = select(&key, request, matches)?;
      return container.validate_binding(&binding, request);
    }

    if member.is_optional() {
      Ok(())
    } else {
      Err(Error::NotFound {
        key,
        chain: request.describe_chain(),
      })
    }
  }
}
