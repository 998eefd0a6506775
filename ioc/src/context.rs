//! The description of a single dependency request and the chain of requests above it.

use crate::container::Container;
use crate::core::{BindingKey, ContractType, Identifier};
use std::fmt;

/// Which containers a request may be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InjectSources {
  /// The requesting container first, then each ancestor in turn.
  #[default]
  Any,
  /// Only the requesting container.
  Local,
  /// Only the direct parent of the requesting container.
  Parent,
  /// Every ancestor of the requesting container, nearest first.
  AnyParent,
}

pub(crate) type BindingId = u64;

/// Describes who is asking for what.
///
/// Contexts form a chain through `parent` while a dependency graph is being built;
/// the chain is borrowed from the stack, so it can never loop back on itself.
/// Conditions attached to bindings receive the context of the request they are
/// asked to serve.
#[derive(Clone)]
pub struct InjectContext<'a> {
  container: &'a Container,
  contract: ContractType,
  identifier: Option<Identifier>,
  object_type: Option<ContractType>,
  member_name: Option<&'static str>,
  optional: bool,
  source: InjectSources,
  parent: Option<&'a InjectContext<'a>>,
  binding: Option<BindingId>,
}

impl<'a> InjectContext<'a> {
  /// A root request for `contract`, issued against `container`.
  pub fn new(container: &'a Container, contract: ContractType) -> Self {
    Self {
      container,
      contract,
      identifier: None,
      object_type: None,
      member_name: None,
      optional: false,
      source: InjectSources::Any,
      parent: None,
      binding: None,
    }
  }

  pub fn of<T: ?Sized + 'static>(container: &'a Container) -> Self {
    Self::new(container, ContractType::of::<T>())
  }

  pub fn with_id(self, identifier: impl Into<Identifier>) -> Self {
    self.with_identifier(Some(identifier.into()))
  }

  pub fn with_identifier(mut self, identifier: Option<Identifier>) -> Self {
    self.identifier = identifier;
    self
  }

  pub fn with_object_type(mut self, object_type: ContractType) -> Self {
    self.object_type = Some(object_type);
    self
  }

  pub fn with_member(mut self, member_name: &'static str) -> Self {
    self.member_name = Some(member_name);
    self
  }

  pub fn with_optional(mut self, optional: bool) -> Self {
    self.optional = optional;
    self
  }

  pub fn with_source(mut self, source: InjectSources) -> Self {
    self.source = source;
    self
  }

  /// A nested request made while serving this one.
  pub fn push(&self, contract: ContractType, identifier: Option<Identifier>) -> InjectContext<'_> {
    InjectContext {
      container: self.container,
      contract,
      identifier,
      object_type: None,
      member_name: None,
      optional: false,
      source: InjectSources::Any,
      parent: Some(self),
      binding: None,
    }
  }

  /// The same request, now being served by `binding` owned by `container`.
  pub(crate) fn served_by<'b>(
    &'b self,
    container: &'b Container,
    binding: BindingId,
  ) -> InjectContext<'b> {
    InjectContext {
      container,
      contract: self.contract,
      identifier: self.identifier.clone(),
      object_type: self.object_type,
      member_name: self.member_name,
      optional: self.optional,
      source: self.source,
      parent: self.parent,
      binding: Some(binding),
    }
  }

  pub fn container(&self) -> &'a Container {
    self.container
  }

  pub fn contract(&self) -> ContractType {
    self.contract
  }

  pub fn identifier(&self) -> Option<&Identifier> {
    self.identifier.as_ref()
  }

  pub fn key(&self) -> BindingKey {
    BindingKey::new(self.contract, self.identifier.clone())
  }

  /// The type whose construction issued this request, if any.
  pub fn object_type(&self) -> Option<ContractType> {
    self.object_type
  }

  pub fn member_name(&self) -> Option<&'static str> {
    self.member_name
  }

  pub fn is_optional(&self) -> bool {
    self.optional
  }

  pub fn source(&self) -> InjectSources {
    self.source
  }

  pub fn parent(&self) -> Option<&'a InjectContext<'a>> {
    self.parent
  }

  /// This context followed by every parent up to the root request.
  pub fn parents_and_self(&self) -> impl Iterator<Item = &InjectContext<'a>> + '_ {
    std::iter::successors(Some(self), |ctx| ctx.parent)
  }

  /// Every object type on the chain, innermost first.
  pub fn all_object_types(&self) -> impl Iterator<Item = ContractType> + '_ {
    self.parents_and_self().filter_map(|ctx| ctx.object_type)
  }

  /// Number of requests on the chain, this one included.
  pub fn depth(&self) -> usize {
    self.parents_and_self().count()
  }

  pub(crate) fn is_serving(&self, binding: BindingId) -> bool {
    self
      .parents_and_self()
      .any(|ctx| ctx.binding == Some(binding))
  }

  /// Renders the chain from the root request down to this one, e.g. `A -> B -> A`.
  pub fn describe_chain(&self) -> String {
    let mut links: Vec<String> = self
      .parents_and_self()
      .map(|ctx| ctx.key().to_string())
      .collect();
    links.reverse();
    links.join(" -> ")
  }
}

impl fmt::Debug for InjectContext<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InjectContext")
      .field("contract", &self.contract)
      .field("identifier", &self.identifier)
      .field("object_type", &self.object_type)
      .field("member_name", &self.member_name)
      .field("optional", &self.optional)
      .field("source", &self.source)
      .field("depth", &self.depth())
      .finish_non_exhaustive()
  }
}
