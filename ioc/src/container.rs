//! The `Container`: binding registry, resolver and sub-container hierarchy.

use crate::binding::{
  BindInfo, ConcreteBinder, CopyMode, FactoryBindInfo, FactoryToBinder, ProviderFactory, Scope,
  ScopeConditionBinder,
};
use crate::context::{BindingId, InjectContext, InjectSources};
use crate::core::{BindingKey, ContractType, Identifier, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::inject::{Injectable, Injector};
use crate::lazy::Lazy;
use crate::provider::{CachedProvider, Provider, ProviderKind};
use crate::settings::ContainerSettings;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// A binding installed in one container.
pub(crate) struct Binding {
  id: BindingId,
  info: Arc<BindInfo>,
  provider_factory: ProviderFactory,
  provider: Arc<dyn Provider>,
}

impl Binding {
  pub(crate) fn id(&self) -> BindingId {
    self.id
  }

  pub(crate) fn info(&self) -> &BindInfo {
    &self.info
  }

  pub(crate) fn provider(&self) -> &Arc<dyn Provider> {
    &self.provider
  }

  /// Converts an instance produced by the provider into the requested contract.
  fn cast(&self, contract: ContractType, instance: Instance) -> Result<Instance> {
    match self
      .info
      .contracts()
      .iter()
      .find(|c| c.contract_type() == contract)
    {
      Some(c) => c.apply(instance),
      None => Ok(instance),
    }
  }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct SingletonId {
  concrete: ContractType,
  identifier: Option<Identifier>,
}

struct SingletonSlot {
  kind: ProviderKind,
  // The provider factory that filled the slot; copies of one binding share it.
  origin: ProviderFactory,
  // Built purely from the concrete type, so any other such binding may join.
  by_type: bool,
  provider: Arc<CachedProvider>,
}

fn same_origin(a: &ProviderFactory, b: &ProviderFactory) -> bool {
  std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

struct ContainerInner {
  id: u64,
  parent: Option<Container>,
  settings: Arc<ContainerSettings>,
  bindings: DashMap<BindingKey, Vec<Arc<Binding>>>,
  // Registration order; `bindings` alone cannot reproduce it across keys.
  installed: Mutex<Vec<Arc<Binding>>>,
  // Only used on the root container.
  singletons: DashMap<SingletonId, SingletonSlot>,
}

/// The dependency injection container.
///
/// A `Container` is a cheap handle; clones refer to the same registry. Bindings may be
/// added at any time, including from inside a provider, and resolution may run from
/// several threads. No registry lock is held while a provider is running.
#[derive(Clone)]
pub struct Container {
  inner: Arc<ContainerInner>,
}

/// A non-owning handle to a [`Container`], held by lazies and factories.
#[derive(Clone)]
pub struct WeakContainer {
  inner: Weak<ContainerInner>,
}

impl WeakContainer {
  pub fn upgrade(&self) -> Option<Container> {
    self.inner.upgrade().map(|inner| Container { inner })
  }
}

impl fmt::Debug for WeakContainer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakContainer")
      .field("alive", &(self.inner.strong_count() > 0))
      .finish()
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("id", &self.inner.id)
      .field("parent", &self.inner.parent.as_ref().map(|p| p.inner.id))
      .field("bindings", &self.inner.installed.lock().len())
      .finish()
  }
}

impl Container {
  /// Creates an empty root container with default settings.
  pub fn new() -> Self {
    Self::with_settings(ContainerSettings::default())
  }

  pub fn with_settings(settings: ContainerSettings) -> Self {
    Self::build(None, Arc::new(settings))
  }

  fn build(parent: Option<Container>, settings: Arc<ContainerSettings>) -> Self {
    Self {
      inner: Arc::new(ContainerInner {
        id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        parent,
        settings,
        bindings: DashMap::new(),
        installed: Mutex::new(Vec::new()),
        singletons: DashMap::new(),
      }),
    }
  }

  /// Creates a child container that falls back to this one for anything it cannot serve.
  ///
  /// Bindings marked with `copy_into_direct_sub_containers` or
  /// `copy_into_all_sub_containers` are reinstalled in the child with a fresh provider,
  /// so their cached instances are not shared with this container.
  pub fn create_sub_container(&self) -> Result<Container> {
    let child = Self::build(Some(self.clone()), self.inner.settings.clone());

    let inherited: Vec<Arc<Binding>> = self
      .inner
      .installed
      .lock()
      .iter()
      .filter(|b| b.info.copy_mode() != CopyMode::None)
      .cloned()
      .collect();

    for binding in &inherited {
      let info = match binding.info.copy_mode() {
        CopyMode::DirectSubContainers => binding.info.without_copy(),
        _ => BindInfo::clone(&binding.info),
      };
      child.install(info, binding.provider_factory.clone())?;
    }

    debug!(
      parent = self.inner.id,
      container = child.inner.id,
      copied = inherited.len(),
      "Created sub-container"
    );
    Ok(child)
  }

  pub fn parent(&self) -> Option<&Container> {
    self.inner.parent.as_ref()
  }

  /// The top of this container's hierarchy; `Single` instances live here.
  pub fn root(&self) -> &Container {
    let mut container = self;
    while let Some(parent) = container.parent() {
      container = parent;
    }
    container
  }

  pub fn settings(&self) -> &ContainerSettings {
    &self.inner.settings
  }

  pub fn downgrade(&self) -> WeakContainer {
    WeakContainer {
      inner: Arc::downgrade(&self.inner),
    }
  }

  /// Whether both handles refer to the same container.
  pub fn same(&self, other: &Container) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  // --- Binding ---

  /// Starts a binding for contract `T`.
  ///
  /// ```
  /// use std::sync::Arc;
  /// use zenject::Container;
  ///
  /// trait Greeter: Send + Sync { fn greet(&self) -> String; }
  /// struct English;
  /// impl Greeter for English { fn greet(&self) -> String { "Hello!".into() } }
  ///
  /// let container = Container::new();
  /// container
  ///   .bind::<dyn Greeter>()
  ///   .to::<English>(|english| english)
  ///   .from_instance(English)
  ///   .finish()
  ///   .unwrap();
  ///
  /// let greeter: Arc<dyn Greeter> = container.resolve().unwrap();
  /// assert_eq!(greeter.greet(), "Hello!");
  /// ```
  pub fn bind<T: ?Sized + Send + Sync + 'static>(&self) -> ConcreteBinder<'_, T> {
    ConcreteBinder::new(self)
  }

  /// Starts a binding of `T` to an existing value.
  pub fn bind_instance<T: Send + Sync + 'static>(
    &self,
    instance: T,
  ) -> ScopeConditionBinder<'_, T, T> {
    self.bind::<T>().from_instance(instance)
  }

  /// Starts a binding of a [`PlaceholderFactory<T>`](crate::PlaceholderFactory).
  pub fn bind_factory<T: ?Sized + Send + Sync + 'static>(&self) -> FactoryToBinder<'_, T> {
    FactoryToBinder::new(self)
  }

  /// Installs a finished binding: one registry entry per contract type it declares.
  ///
  /// Duplicate keys are accepted; ambiguity is reported when the key is resolved.
  pub fn register(&self, info: BindInfo, factory: FactoryBindInfo) -> Result<()> {
    info.check()?;
    let provider_factory = factory.into_provider_factory().ok_or_else(|| {
      Error::invalid_binding(
        info.describe_contracts(),
        "no provider was chosen for this binding",
      )
    })?;
    self.install(info, provider_factory)
  }

  fn install(&self, info: BindInfo, provider_factory: ProviderFactory) -> Result<()> {
    let provider = provider_factory(self, &info)?;
    let provider = self.apply_scope(&info, provider, &provider_factory)?;

    let binding = Arc::new(Binding {
      id: NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed),
      info: Arc::new(info),
      provider_factory,
      provider,
    });

    for contract in binding.info.contracts() {
      let key = BindingKey::new(contract.contract_type(), binding.info.identifier().cloned());
      self
        .inner
        .bindings
        .entry(key)
        .or_default()
        .push(binding.clone());
    }
    self.inner.installed.lock().push(binding.clone());

    debug!(
      container = self.inner.id,
      contracts = %binding.info.describe_contracts(),
      identifier = ?binding.info.identifier(),
      scope = ?binding.info.scope(),
      provider = ?binding.provider.kind(),
      "Registered binding"
    );
    Ok(())
  }

  /// Wraps `provider`, built by `origin`, according to the binding's scope.
  pub(crate) fn apply_scope(
    &self,
    info: &BindInfo,
    provider: Arc<dyn Provider>,
    origin: &ProviderFactory,
  ) -> Result<Arc<dyn Provider>> {
    if provider.is_cached() {
      return Ok(provider);
    }
    match info.scope() {
      Scope::Transient => Ok(provider),
      Scope::Cached => Ok(Arc::new(CachedProvider::new(provider))),
      Scope::Single => self.root().singleton(info, provider, origin),
    }
  }

  /// The shared slot of a `Single` binding.
  ///
  /// Bindings that build the concrete type with `from_new` and no arguments share one
  /// slot; anything else (a method, arguments, a factory) may only be shared by copies
  /// of the binding that created the slot.
  fn singleton(
    &self,
    info: &BindInfo,
    provider: Arc<dyn Provider>,
    origin: &ProviderFactory,
  ) -> Result<Arc<dyn Provider>> {
    let concrete = info
      .concrete_type()
      .or_else(|| provider.instance_type())
      .ok_or_else(|| {
        Error::invalid_binding(
          info.describe_contracts(),
          "as_single needs a known concrete type",
        )
      })?;
    let id = SingletonId {
      concrete,
      identifier: info.concrete_identifier().cloned(),
    };

    let kind = provider.kind();
    let by_type = kind == ProviderKind::Transient && info.arguments().is_empty();
    let slot = self.inner.singletons.entry(id).or_insert_with(|| SingletonSlot {
      kind,
      origin: origin.clone(),
      by_type,
      provider: Arc::new(CachedProvider::new(provider)),
    });
    if slot.kind != kind {
      return Err(Error::invalid_binding(
        info.describe_contracts(),
        format!(
          "'{}' is already a single instance created by {:?} and cannot also be created by {:?}",
          concrete, slot.kind, kind
        ),
      ));
    }
    if !(same_origin(&slot.origin, origin) || (slot.by_type && by_type)) {
      return Err(Error::invalid_binding(
        info.describe_contracts(),
        format!(
          "'{}' is already a single instance configured by another binding; use with_concrete_id to keep them apart",
          concrete
        ),
      ));
    }
    Ok(slot.provider.clone())
  }

  /// Whether anything is bound to `T` here or in an ancestor, ignoring conditions.
  pub fn has_binding<T: ?Sized + 'static>(&self) -> bool {
    self.has_binding_key(&BindingKey::of::<T>())
  }

  pub fn has_binding_id<T: ?Sized + 'static>(&self, identifier: impl Into<Identifier>) -> bool {
    self.has_binding_key(&BindingKey::new(
      ContractType::of::<T>(),
      Some(identifier.into()),
    ))
  }

  pub fn has_binding_key(&self, key: &BindingKey) -> bool {
    self.sources(InjectSources::Any).iter().any(|container| {
      container
        .inner
        .bindings
        .get(key)
        .map_or(false, |list| !list.is_empty())
    })
  }

  pub(crate) fn installed(&self) -> Vec<Arc<Binding>> {
    self.inner.installed.lock().clone()
  }

  // --- Resolution ---

  /// Resolves the single binding for `T`.
  pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
    self.resolve_with_identifier(None)
  }

  pub fn resolve_id<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: impl Into<Identifier>,
  ) -> Result<Arc<T>> {
    self.resolve_with_identifier(Some(identifier.into()))
  }

  /// Resolves `T` if it is bound; broken bindings still fail.
  pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
    self.try_resolve_with_identifier(None)
  }

  pub fn try_resolve_id<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: impl Into<Identifier>,
  ) -> Result<Option<Arc<T>>> {
    self.try_resolve_with_identifier(Some(identifier.into()))
  }

  /// Every instance bound to `T`: this container's bindings first, then each ancestor's,
  /// in registration order. Nothing bound yields an empty list.
  pub fn resolve_all<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>> {
    self.resolve_all_with_identifier(None)
  }

  pub fn resolve_all_id<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: impl Into<Identifier>,
  ) -> Result<Vec<Arc<T>>> {
    self.resolve_all_with_identifier(Some(identifier.into()))
  }

  /// A handle that resolves `T` on first use.
  pub fn lazy<T: ?Sized + Send + Sync + 'static>(&self) -> Lazy<T> {
    Lazy::new(self.downgrade(), None)
  }

  pub fn lazy_id<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: impl Into<Identifier>,
  ) -> Lazy<T> {
    Lazy::new(self.downgrade(), Some(identifier.into()))
  }

  /// Builds a `C` with its members resolved from this container, without binding it.
  pub fn instantiate<C: Injectable>(&self) -> Result<C> {
    self.instantiate_with(Vec::new())
  }

  pub fn instantiate_with<C: Injectable>(&self, args: Vec<TypedArg>) -> Result<C> {
    let context = InjectContext::of::<C>(self);
    Injector::construct::<C>(self, &context, args)
  }

  pub(crate) fn resolve_with_identifier<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: Option<Identifier>,
  ) -> Result<Arc<T>> {
    let context = InjectContext::of::<T>(self).with_identifier(identifier);
    match self.resolve_context(&context)? {
      Some(instance) => instance.expect_type::<T>(),
      None => Err(Error::NotFound {
        key: context.key(),
        chain: context.describe_chain(),
      }),
    }
  }

  fn try_resolve_with_identifier<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: Option<Identifier>,
  ) -> Result<Option<Arc<T>>> {
    let context = InjectContext::of::<T>(self)
      .with_identifier(identifier)
      .with_optional(true);
    self
      .resolve_context(&context)?
      .map(|instance| instance.expect_type::<T>())
      .transpose()
  }

  fn resolve_all_with_identifier<T: ?Sized + Send + Sync + 'static>(
    &self,
    identifier: Option<Identifier>,
  ) -> Result<Vec<Arc<T>>> {
    let context = InjectContext::of::<T>(self)
      .with_identifier(identifier)
      .with_optional(true);
    self
      .resolve_all_context(&context)?
      .iter()
      .map(Instance::expect_type::<T>)
      .collect()
  }

  /// Serves one request. `Ok(None)` means nothing is bound for it; the caller decides
  /// whether that is an error.
  ///
  /// Only the nearest container level with a matching binding is considered. Within it a
  /// single match wins; among several, a binding whose condition matched is preferred
  /// over unconditioned ones (the first registered if several did); several
  /// unconditioned matches are ambiguous.
  pub fn resolve_context(&self, context: &InjectContext<'_>) -> Result<Option<Instance>> {
    self.check_depth(context)?;
    let key = context.key();

    for container in self.sources(context.source()) {
      let matches = container.matching(&key, context);
      if matches.is_empty() {
        continue;
      }
      let binding = select(&key, context, matches)?;
      return container.provide(&binding, context).map(Some);
    }

    trace!(
      contract = %key,
      container = self.inner.id,
      optional = context.is_optional(),
      "No binding found"
    );
    Ok(None)
  }

  /// Serves a collection request: every matching binding of every searched level.
  ///
  /// An empty result is an error unless the request is optional.
  pub fn resolve_all_context(&self, context: &InjectContext<'_>) -> Result<Vec<Instance>> {
    self.check_depth(context)?;
    let key = context.key();

    let mut instances = Vec::new();
    for container in self.sources(context.source()) {
      for binding in container.matching(&key, context) {
        instances.push(container.provide(&binding, context)?);
      }
    }

    if instances.is_empty() && !context.is_optional() {
      return Err(Error::NotFound {
        key,
        chain: context.describe_chain(),
      });
    }
    Ok(instances)
  }

  /// Resolves every binding marked `non_lazy`, in registration order.
  pub fn resolve_roots(&self) -> Result<()> {
    let roots: Vec<Arc<Binding>> = self
      .installed()
      .into_iter()
      .filter(|b| b.info.is_non_lazy())
      .collect();

    for binding in &roots {
      let Some(contract) = binding.info.contracts().first() else {
        continue;
      };
      let context = InjectContext::new(self, contract.contract_type())
        .with_identifier(binding.info.identifier().cloned());
      self.provide(binding, &context)?;
    }

    debug!(container = self.inner.id, roots = roots.len(), "Resolved root bindings");
    Ok(())
  }

  // --- Internals shared with validation ---

  /// The containers a request with `source` searches, nearest first.
  pub(crate) fn sources(&self, source: InjectSources) -> Vec<&Container> {
    let ancestors = std::iter::successors(self.parent(), |c| c.parent());
    match source {
      InjectSources::Any => std::iter::once(self).chain(ancestors).collect(),
      InjectSources::Local => vec![self],
      InjectSources::Parent => self.parent().into_iter().collect(),
      InjectSources::AnyParent => ancestors.collect(),
    }
  }

  /// This container's bindings for `key` whose condition accepts `context`.
  pub(crate) fn matching(&self, key: &BindingKey, context: &InjectContext<'_>) -> Vec<Arc<Binding>> {
    // Clone the list out so no shard lock is held while conditions run.
    let candidates = match self.inner.bindings.get(key) {
      Some(list) => list.clone(),
      None => return Vec::new(),
    };
    candidates
      .into_iter()
      .filter(|b| b.info.condition().map_or(true, |condition| condition(context)))
      .collect()
  }

  pub(crate) fn check_depth(&self, context: &InjectContext<'_>) -> Result<()> {
    let max_depth = self.inner.settings.max_resolve_depth();
    if context.depth() > max_depth {
      return Err(Error::DepthExceeded {
        max_depth,
        chain: context.describe_chain(),
      });
    }
    Ok(())
  }

  fn provide(&self, binding: &Binding, context: &InjectContext<'_>) -> Result<Instance> {
    if context.is_serving(binding.id) {
      return Err(Error::CircularDependency {
        chain: context.describe_chain(),
      });
    }

    trace!(
      contract = %context.key(),
      container = self.inner.id,
      depth = context.depth(),
      provider = ?binding.provider.kind(),
      "Resolving"
    );
    let served = context.served_by(self, binding.id);
    let instance = binding.provider.provide(self, &served, Vec::new())?;
    binding.cast(context.contract(), instance)
  }
}

/// Picks the binding that serves a request among the matches of one container level.
pub(crate) fn select(
  key: &BindingKey,
  context: &InjectContext<'_>,
  mut matches: Vec<Arc<Binding>>,
) -> Result<Arc<Binding>> {
  if matches.len() == 1 {
    return Ok(matches.remove(0));
  }

  let mut conditioned = matches.iter().filter(|b| b.info.condition().is_some());
  let Some(first) = conditioned.next().cloned() else {
    return Err(Error::Ambiguous {
      key: key.clone(),
      matches: matches.len(),
      chain: context.describe_chain(),
    });
  };

  let others = conditioned.count();
  if others > 0 {
    warn!(
      contract = %key,
      matched = others + 1,
      "Several conditional bindings matched; using the first registered"
    );
  } else {
    debug!(contract = %key, "Conditional binding takes precedence over unconditioned ones");
  }
  Ok(first)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sources_follow_the_hierarchy() {
    let root = Container::new();
    let child = root.create_sub_container().unwrap();
    let grandchild = child.create_sub_container().unwrap();

    let ids = |list: Vec<&Container>| list.iter().map(|c| c.inner.id).collect::<Vec<_>>();
    let (r, c, g) = (root.inner.id, child.inner.id, grandchild.inner.id);

    assert_eq!(ids(grandchild.sources(InjectSources::Any)), vec![g, c, r]);
    assert_eq!(ids(grandchild.sources(InjectSources::Local)), vec![g]);
    assert_eq!(ids(grandchild.sources(InjectSources::Parent)), vec![c]);
    assert_eq!(ids(grandchild.sources(InjectSources::AnyParent)), vec![c, r]);
    assert!(root.sources(InjectSources::Parent).is_empty());
    assert!(grandchild.root().same(&root));
  }

  #[test]
  fn test_weak_handle_does_not_keep_the_container_alive() {
    let container = Container::new();
    let weak = container.downgrade();
    assert!(weak.upgrade().is_some());

    drop(container);
    assert!(weak.upgrade().is_none());
  }

  #[test]
  fn test_register_without_provider_is_rejected() {
    let container = Container::new();
    let info = BindInfo::new(crate::binding::Contract::of::<String>());

    let err = container.register(info, FactoryBindInfo::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));
    assert!(!container.has_binding::<String>());
  }
}
