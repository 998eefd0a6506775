//! Explicit injection descriptors and the member resolver used while constructing them.
//!
//! A type becomes constructible by the container by implementing [`Injectable`]. The
//! `construct` function asks the [`Injector`] for each member in declaration order;
//! `dependencies` describes the same members up front so bindings can be validated
//! without building anything.

use crate::container::Container;
use crate::context::{InjectContext, InjectSources};
use crate::core::{BindingKey, ContractType, Identifier, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::lazy::Lazy;
use std::sync::Arc;

/// A type the container can build itself.
///
/// ```
/// use std::sync::Arc;
/// use zenject::{Container, Injectable, InjectableMember, Injector, Result};
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// impl Injectable for Database {
///   fn dependencies() -> Vec<InjectableMember> {
///     vec![InjectableMember::of::<Config>("config")]
///   }
///
///   fn construct(injector: &mut Injector<'_>) -> Result<Self> {
///     let config: Arc<Config> = injector.resolve()?;
///     Ok(Database { url: config.url.clone() })
///   }
/// }
///
/// # fn main() -> Result<()> {
/// let container = Container::new();
/// container.bind_instance(Config { url: "postgres://db".into() }).finish()?;
/// container.bind::<Database>().from_new().as_cached().finish()?;
///
/// assert_eq!(container.resolve::<Database>()?.url, "postgres://db");
/// # Ok(())
/// # }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
  /// The members `construct` requests, in the order it requests them.
  fn dependencies() -> Vec<InjectableMember> {
    Vec::new()
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self>;
}

/// Describes one injected member of an [`Injectable`] type.
#[derive(Debug, Clone)]
pub struct InjectableMember {
  name: &'static str,
  contract: ContractType,
  identifier: Option<Identifier>,
  optional: bool,
  collection: bool,
  lazy: bool,
  source: InjectSources,
}

impl InjectableMember {
  pub fn new(name: &'static str, contract: ContractType) -> Self {
    Self {
      name,
      contract,
      identifier: None,
      optional: false,
      collection: false,
      lazy: false,
      source: InjectSources::Any,
    }
  }

  pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
    Self::new(name, ContractType::of::<T>())
  }

  pub fn with_id(self, identifier: impl Into<Identifier>) -> Self {
    self.with_identifier(Some(identifier.into()))
  }

  pub fn with_identifier(mut self, identifier: Option<Identifier>) -> Self {
    self.identifier = identifier;
    self
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  /// The member receives every matching instance.
  pub fn collection(mut self) -> Self {
    self.collection = true;
    self
  }

  /// The member is resolved later through a [`Lazy`], so it does not extend the chain.
  pub fn lazy(mut self) -> Self {
    self.lazy = true;
    self
  }

  pub fn from_source(mut self, source: InjectSources) -> Self {
    self.source = source;
    self
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn contract(&self) -> ContractType {
    self.contract
  }

  pub fn identifier(&self) -> Option<&Identifier> {
    self.identifier.as_ref()
  }

  pub fn is_optional(&self) -> bool {
    self.optional
  }

  pub fn is_collection(&self) -> bool {
    self.collection
  }

  pub fn is_lazy(&self) -> bool {
    self.lazy
  }

  pub fn source(&self) -> InjectSources {
    self.source
  }
}

/// Resolves the members of one instance under construction.
///
/// Each request first consumes a matching explicit argument, if any, and otherwise
/// goes to the container with a child context whose object type is the type being built.
pub struct Injector<'a> {
  container: &'a Container,
  context: &'a InjectContext<'a>,
  concrete: ContractType,
  args: Vec<TypedArg>,
}

impl<'a> Injector<'a> {
  pub(crate) fn new(
    container: &'a Container,
    context: &'a InjectContext<'a>,
    concrete: ContractType,
    args: Vec<TypedArg>,
  ) -> Self {
    Self {
      container,
      context,
      concrete,
      args,
    }
  }

  /// Builds a `C`, failing if any explicit argument was left unconsumed.
  pub(crate) fn construct<C: Injectable>(
    container: &Container,
    context: &InjectContext<'_>,
    args: Vec<TypedArg>,
  ) -> Result<C> {
    let mut injector = Injector::new(container, context, ContractType::of::<C>(), args);
    let value = C::construct(&mut injector)?;
    injector.finish()?;
    Ok(value)
  }

  /// The request this instance is being built for.
  pub fn context(&self) -> &InjectContext<'a> {
    self.context
  }

  pub fn container(&self) -> &'a Container {
    self.container
  }

  pub fn resolve<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
    self.inject::<T>(&InjectableMember::of::<T>(""))
  }

  pub fn resolve_id<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    identifier: impl Into<Identifier>,
  ) -> Result<Arc<T>> {
    self.inject::<T>(&InjectableMember::of::<T>("").with_id(identifier))
  }

  pub fn optional<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Option<Arc<T>>> {
    self.member::<T>(&InjectableMember::of::<T>("").optional())
  }

  /// Resolves `T` if it is bound, otherwise hands back `default`.
  pub fn optional_or<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    default: Arc<T>,
  ) -> Result<Arc<T>> {
    Ok(self.optional::<T>()?.unwrap_or(default))
  }

  /// Every instance bound to `T`; fails when there is none.
  pub fn all<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Vec<Arc<T>>> {
    self.member_all::<T>(&InjectableMember::of::<T>("").collection())
  }

  /// Every instance bound to `T`, possibly none.
  pub fn all_optional<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Vec<Arc<T>>> {
    self.member_all::<T>(&InjectableMember::of::<T>("").collection().optional())
  }

  pub fn lazy<T: ?Sized + Send + Sync + 'static>(&mut self) -> Lazy<T> {
    Lazy::new(self.container.downgrade(), None)
  }

  pub fn lazy_id<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    identifier: impl Into<Identifier>,
  ) -> Lazy<T> {
    Lazy::new(self.container.downgrade(), Some(identifier.into()))
  }

  /// Resolves a single member described by `member`; `None` when nothing is bound for it.
  pub fn member<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    member: &InjectableMember,
  ) -> Result<Option<Arc<T>>> {
    if let Some(position) = self
      .args
      .iter()
      .position(|arg| arg.matches(member.contract, member.identifier.as_ref()))
    {
      return self.args.remove(position).into_instance().expect_type::<T>().map(Some);
    }

    let request = self.request(member);
    match self.container.resolve_context(&request)? {
      Some(instance) => instance.expect_type::<T>().map(Some),
      None => Ok(None),
    }
  }

  /// Resolves every instance for a collection member, in registration order.
  pub fn member_all<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    member: &InjectableMember,
  ) -> Result<Vec<Arc<T>>> {
    let request = self.request(member);
    self
      .container
      .resolve_all_context(&request)?
      .iter()
      .map(Instance::expect_type::<T>)
      .collect()
  }

  /// Resolves a required member described by `member`.
  pub fn inject<T: ?Sized + Send + Sync + 'static>(
    &mut self,
    member: &InjectableMember,
  ) -> Result<Arc<T>> {
    self.member::<T>(member)?.ok_or_else(|| Error::NotFound {
      key: BindingKey::new(member.contract, member.identifier.clone()),
      chain: self.context.describe_chain(),
    })
  }

  fn request(&self, member: &InjectableMember) -> InjectContext<'a> {
    let mut request = self
      .context
      .push(member.contract, member.identifier.clone())
      .with_object_type(self.concrete)
      .with_optional(member.optional)
      .with_source(member.source);
    if !member.name.is_empty() {
      request = request.with_member(member.name);
    }
    request
  }

  fn finish(self) -> Result<()> {
    if self.args.is_empty() {
      return Ok(());
    }
    Err(Error::UnusedArguments {
      concrete: self.concrete,
      arguments: self
        .args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(", "),
    })
  }
}
