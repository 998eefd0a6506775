//! Core identity types: contract types, identifiers, binding keys and type-erased instances.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

thread_local! {
  // Cached providers that are currently creating their instance on this thread.
  // A provider that re-enters its own creation is part of a cycle that crossed a
  // lazy or factory boundary, which the context chain alone cannot see.
  static CREATING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// An RAII guard marking a cached slot as "being created" on the current thread.
pub(crate) struct CreationGuard {
  slot: usize,
}

impl CreationGuard {
  /// Returns `None` when the slot is already being created further up the stack.
  pub(crate) fn enter(slot: usize) -> Option<Self> {
    let inserted = CREATING.with(|set| set.borrow_mut().insert(slot));
    inserted.then(|| Self { slot })
  }
}

impl Drop for CreationGuard {
  fn drop(&mut self) {
    CREATING.with(|set| {
      set.borrow_mut().remove(&self.slot);
    });
  }
}

/// The runtime identity of a contract or concrete type.
///
/// Works for unsized types too, so `dyn Trait` contracts have an identity of their own.
#[derive(Clone, Copy)]
pub struct ContractType {
  id: TypeId,
  name: &'static str,
}

impl ContractType {
  pub fn of<T: ?Sized + 'static>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn is<T: ?Sized + 'static>(&self) -> bool {
    self.id == TypeId::of::<T>()
  }
}

impl PartialEq for ContractType {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ContractType {}

impl Hash for ContractType {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for ContractType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ContractType({})", self.name)
  }
}

impl fmt::Display for ContractType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

static NEXT_UNIQUE_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque binding identifier.
///
/// Identifiers are compared by value; a string name and a number never collide.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identifier(IdRepr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum IdRepr {
  Name(Arc<str>),
  Number(i64),
  Unique(u64),
}

impl Identifier {
  /// A process-unique identifier that no user binding can collide with.
  pub fn unique() -> Self {
    Identifier(IdRepr::Unique(
      NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
    ))
  }

  pub fn as_str(&self) -> Option<&str> {
    match &self.0 {
      IdRepr::Name(name) => Some(name),
      _ => None,
    }
  }
}

impl From<&str> for Identifier {
  fn from(name: &str) -> Self {
    Identifier(IdRepr::Name(Arc::from(name)))
  }
}

impl From<String> for Identifier {
  fn from(name: String) -> Self {
    Identifier(IdRepr::Name(Arc::from(name)))
  }
}

impl From<&String> for Identifier {
  fn from(name: &String) -> Self {
    Identifier::from(name.as_str())
  }
}

impl From<i64> for Identifier {
  fn from(number: i64) -> Self {
    Identifier(IdRepr::Number(number))
  }
}

impl From<&Identifier> for Identifier {
  fn from(id: &Identifier) -> Self {
    id.clone()
  }
}

impl fmt::Display for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.0 {
      IdRepr::Name(name) => f.write_str(name),
      IdRepr::Number(n) => write!(f, "#{}", n),
      IdRepr::Unique(n) => write!(f, "<unique {}>", n),
    }
  }
}

impl fmt::Debug for Identifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Identifier({})", self)
  }
}

/// The registry key of a binding: a contract type plus an optional identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
  contract: ContractType,
  identifier: Option<Identifier>,
}

impl BindingKey {
  pub fn new(contract: ContractType, identifier: Option<Identifier>) -> Self {
    Self {
      contract,
      identifier,
    }
  }

  pub fn of<T: ?Sized + 'static>() -> Self {
    Self::new(ContractType::of::<T>(), None)
  }

  pub fn contract(&self) -> ContractType {
    self.contract
  }

  pub fn identifier(&self) -> Option<&Identifier> {
    self.identifier.as_ref()
  }
}

impl fmt::Debug for BindingKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.identifier {
      Some(id) => write!(f, "Key({}, Id({}))", self.contract, id),
      None => write!(f, "Key({})", self.contract),
    }
  }
}

impl fmt::Display for BindingKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.identifier {
      Some(id) => write!(f, "{} (id: {})", self.contract, id),
      None => write!(f, "{}", self.contract),
    }
  }
}

/// A type-erased, shared handle to a provided value.
///
/// The handle stores an `Arc<T>`; [`Instance::downcast`] hands back a clone of that
/// same `Arc`, so two handles produced from one cached slot point at one value.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  ty: ContractType,
}

impl Instance {
  pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
    Self {
      value: Arc::new(value),
      ty: ContractType::of::<T>(),
    }
  }

  /// The type of the `Arc` payload.
  pub fn type_info(&self) -> ContractType {
    self.ty
  }

  pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
    (*self.value).downcast_ref::<Arc<T>>().cloned()
  }

  pub(crate) fn expect_type<T: ?Sized + Send + Sync + 'static>(
    &self,
  ) -> crate::Result<Arc<T>> {
    self.downcast::<T>().ok_or(crate::Error::TypeMismatch {
      expected: ContractType::of::<T>(),
      actual: self.ty,
    })
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.ty)
  }
}

/// An explicit construction argument, matched against injected members by type
/// and, when the argument carries one, by identifier.
#[derive(Clone, Debug)]
pub struct TypedArg {
  value: Instance,
  identifier: Option<Identifier>,
}

impl TypedArg {
  pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
    Self {
      value: Instance::new(value),
      identifier: None,
    }
  }

  pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
    Self::new(Arc::new(value))
  }

  pub fn with_id(mut self, identifier: impl Into<Identifier>) -> Self {
    self.identifier = Some(identifier.into());
    self
  }

  pub fn type_info(&self) -> ContractType {
    self.value.type_info()
  }

  pub(crate) fn matches(&self, contract: ContractType, identifier: Option<&Identifier>) -> bool {
    self.value.type_info() == contract
      && match &self.identifier {
        None => true,
        Some(id) => identifier == Some(id),
      }
  }

  pub(crate) fn into_instance(self) -> Instance {
    self.value
  }
}

impl fmt::Display for TypedArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.identifier {
      Some(id) => write!(f, "{} (id: {})", self.value.type_info(), id),
      None => write!(f, "{}", self.value.type_info()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::hash_map::DefaultHasher;

  trait Marker: Send + Sync {}

  fn hash_of(key: &BindingKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
  }

  #[test]
  fn test_keys_equal_only_when_contract_and_identifier_match() {
    let plain = BindingKey::of::<String>();
    let named = BindingKey::new(ContractType::of::<String>(), Some("a".into()));
    let named_again = BindingKey::new(ContractType::of::<String>(), Some("a".into()));
    let other_type = BindingKey::new(ContractType::of::<u32>(), Some("a".into()));

    assert_ne!(plain, named);
    assert_eq!(named, named_again);
    assert_eq!(hash_of(&named), hash_of(&named_again));
    assert_ne!(named, other_type);
  }

  #[test]
  fn test_identifier_kinds_do_not_collide() {
    assert_ne!(Identifier::from("1"), Identifier::from(1_i64));
    assert_ne!(Identifier::unique(), Identifier::unique());
    assert_eq!(Identifier::from("x").as_str(), Some("x"));
  }

  #[test]
  fn test_instance_downcast_returns_the_same_arc() {
    let value = Arc::new(42_u32);
    let instance = Instance::new(value.clone());

    let back = instance.downcast::<u32>().unwrap();
    assert!(Arc::ptr_eq(&value, &back));
    assert!(instance.downcast::<i32>().is_none());
    assert!(instance.type_info().is::<u32>());
  }

  #[test]
  fn test_dyn_contracts_have_their_own_identity() {
    assert_ne!(ContractType::of::<dyn Marker>(), ContractType::of::<Box<dyn Marker>>());
    assert!(ContractType::of::<dyn Marker>().name().contains("Marker"));
  }

  #[test]
  fn test_creation_guard_rejects_reentry_until_dropped() {
    let guard = CreationGuard::enter(7).unwrap();
    assert!(CreationGuard::enter(7).is_none());
    drop(guard);
    assert!(CreationGuard::enter(7).is_some());
  }

  #[test]
  fn test_typed_arg_matching() {
    let anonymous = TypedArg::of(5_u8);
    let named = TypedArg::of(5_u8).with_id("speed");
    let speed = Identifier::from("speed");

    assert!(anonymous.matches(ContractType::of::<u8>(), None));
    assert!(anonymous.matches(ContractType::of::<u8>(), Some(&speed)));
    assert!(named.matches(ContractType::of::<u8>(), Some(&speed)));
    assert!(!named.matches(ContractType::of::<u8>(), None));
    assert!(!named.matches(ContractType::of::<u16>(), Some(&speed)));
  }
}
