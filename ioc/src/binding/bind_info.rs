use crate::container::Container;
use crate::context::InjectContext;
use crate::core::{ContractType, Identifier, Instance, TypedArg};
use crate::error::{Error, Result};
use crate::provider::Provider;
use std::fmt;
use std::sync::Arc;

/// A predicate deciding whether a binding may serve a request.
pub type Condition = Arc<dyn Fn(&InjectContext<'_>) -> bool + Send + Sync>;

/// Invoked once for every instance a creating provider builds.
pub type InstantiatedCallback = Arc<dyn Fn(&InjectContext<'_>, &Instance) + Send + Sync>;

/// Converts an instance of the concrete type into an instance of a contract type.
pub type Caster = Arc<dyn Fn(Instance) -> Result<Instance> + Send + Sync>;

/// Builds the provider of a binding once the binding is registered in a container.
pub type ProviderFactory =
  Arc<dyn Fn(&Container, &BindInfo) -> Result<Arc<dyn Provider>> + Send + Sync>;

/// Instance lifetime of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
  /// A new instance for every request.
  #[default]
  Transient,
  /// One instance per binding, kept for the lifetime of the owning container.
  Cached,
  /// One instance per concrete type and concrete identifier, kept by the root container
  /// and shared by every binding and nested container that asks for it.
  Single,
}

/// Whether a binding is reinstalled into sub-containers created later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CopyMode {
  #[default]
  None,
  DirectSubContainers,
  AllSubContainers,
}

/// One contract type of a binding, with the conversion from the concrete instance.
#[derive(Clone)]
pub struct Contract {
  ty: ContractType,
  cast: Option<Caster>,
}

impl Contract {
  /// A contract served by instances of exactly this type.
  pub fn of<T: ?Sized + 'static>() -> Self {
    Self {
      ty: ContractType::of::<T>(),
      cast: None,
    }
  }

  /// A contract served by instances of `C`, converted with `cast`.
  pub fn with_cast<C, T>(cast: impl Fn(Arc<C>) -> Arc<T> + Send + Sync + 'static) -> Self
  where
    C: ?Sized + Send + Sync + 'static,
    T: ?Sized + Send + Sync + 'static,
  {
    if ContractType::of::<C>() == ContractType::of::<T>() {
      return Self::of::<T>();
    }
    Self {
      ty: ContractType::of::<T>(),
      cast: Some(Arc::new(move |instance: Instance| {
        let concrete = instance.expect_type::<C>()?;
        Ok(Instance::new(cast(concrete)))
      })),
    }
  }

  pub fn contract_type(&self) -> ContractType {
    self.ty
  }

  pub(crate) fn apply(&self, instance: Instance) -> Result<Instance> {
    match &self.cast {
      Some(cast) => cast(instance),
      None if instance.type_info() == self.ty => Ok(instance),
      None => Err(Error::TypeMismatch {
        expected: self.ty,
        actual: instance.type_info(),
      }),
    }
  }
}

impl fmt::Debug for Contract {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Contract")
      .field("type", &self.ty)
      .field("cast", &self.cast.is_some())
      .finish()
  }
}

/// The configuration of a binding while its binder chain is running.
///
/// A `BindInfo` is owned by exactly one binder chain. Registering it moves it into the
/// container, after which it is shared read-only.
#[derive(Clone, Default)]
pub struct BindInfo {
  contracts: Vec<Contract>,
  identifier: Option<Identifier>,
  concrete_type: Option<ContractType>,
  concrete_identifier: Option<Identifier>,
  scope: Scope,
  condition: Option<Condition>,
  arguments: Vec<TypedArg>,
  instantiated_callback: Option<InstantiatedCallback>,
  copy_mode: CopyMode,
  non_lazy: bool,
  problems: Vec<String>,
}

impl BindInfo {
  pub fn new(contract: Contract) -> Self {
    let mut info = Self::default();
    info.add_contract(contract);
    info
  }

  pub fn add_contract(&mut self, contract: Contract) {
    if contract.ty.is::<()>() {
      self.report("the unit type cannot be used as a contract");
    }
    if self.contracts.iter().any(|c| c.ty == contract.ty) {
      self.report(format!("contract '{}' is listed more than once", contract.ty));
    }
    self.contracts.push(contract);
  }

  /// Replaces the conversion of the first contract; used once the concrete type is chosen.
  pub fn set_primary_contract(&mut self, contract: Contract) {
    match self.contracts.first_mut() {
      Some(first) => *first = contract,
      None => self.contracts.push(contract),
    }
  }

  pub fn set_identifier(&mut self, identifier: Option<Identifier>) {
    self.identifier = identifier;
  }

  pub fn set_concrete_type(&mut self, concrete: ContractType) {
    self.concrete_type = Some(concrete);
  }

  pub fn set_concrete_identifier(&mut self, identifier: Option<Identifier>) {
    self.concrete_identifier = identifier;
  }

  pub fn set_scope(&mut self, scope: Scope) {
    self.scope = scope;
  }

  /// Sets the condition; a later call replaces an earlier one.
  pub fn set_condition(&mut self, condition: Condition) {
    self.condition = Some(condition);
  }

  pub fn set_arguments(&mut self, arguments: Vec<TypedArg>) {
    self.arguments = arguments;
  }

  pub fn set_instantiated_callback(&mut self, callback: InstantiatedCallback) {
    self.instantiated_callback = Some(callback);
  }

  pub fn set_copy_mode(&mut self, copy_mode: CopyMode) {
    self.copy_mode = copy_mode;
  }

  pub fn set_non_lazy(&mut self, non_lazy: bool) {
    self.non_lazy = non_lazy;
  }

  /// Records a configuration mistake; registration will refuse the binding.
  pub fn report(&mut self, problem: impl Into<String>) {
    self.problems.push(problem.into());
  }

  pub fn contracts(&self) -> &[Contract] {
    &self.contracts
  }

  pub fn identifier(&self) -> Option<&Identifier> {
    self.identifier.as_ref()
  }

  pub fn concrete_type(&self) -> Option<ContractType> {
    self.concrete_type
  }

  pub fn concrete_identifier(&self) -> Option<&Identifier> {
    self.concrete_identifier.as_ref()
  }

  pub fn scope(&self) -> Scope {
    self.scope
  }

  pub fn condition(&self) -> Option<&Condition> {
    self.condition.as_ref()
  }

  pub fn arguments(&self) -> &[TypedArg] {
    &self.arguments
  }

  pub fn instantiated_callback(&self) -> Option<&InstantiatedCallback> {
    self.instantiated_callback.as_ref()
  }

  pub fn copy_mode(&self) -> CopyMode {
    self.copy_mode
  }

  pub fn is_non_lazy(&self) -> bool {
    self.non_lazy
  }

  /// A readable list of the contract types, e.g. `dyn Logger, dyn Flush`.
  pub fn describe_contracts(&self) -> String {
    if self.contracts.is_empty() {
      return "<no contract>".to_string();
    }
    self
      .contracts
      .iter()
      .map(|c| c.ty.to_string())
      .collect::<Vec<_>>()
      .join(", ")
  }

  pub(crate) fn check(&self) -> Result<()> {
    if self.contracts.is_empty() {
      return Err(Error::invalid_binding(
        self.describe_contracts(),
        "a binding needs at least one contract type",
      ));
    }
    if !self.problems.is_empty() {
      return Err(Error::invalid_binding(
        self.describe_contracts(),
        self.problems.join("; "),
      ));
    }
    Ok(())
  }

  pub(crate) fn without_copy(&self) -> Self {
    Self {
      copy_mode: CopyMode::None,
      ..self.clone()
    }
  }
}

impl fmt::Debug for BindInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BindInfo")
      .field("contracts", &self.describe_contracts())
      .field("identifier", &self.identifier)
      .field("concrete_type", &self.concrete_type)
      .field("scope", &self.scope)
      .field("conditional", &self.condition.is_some())
      .field("arguments", &self.arguments.len())
      .field("copy_mode", &self.copy_mode)
      .field("non_lazy", &self.non_lazy)
      .finish_non_exhaustive()
  }
}

/// The provider slot of a binding under construction.
///
/// Every `from_*` call of a binder overwrites the slot; whatever it holds when the
/// binding is registered becomes the binding's provider factory.
#[derive(Clone, Default)]
pub struct FactoryBindInfo {
  provider_factory: Option<ProviderFactory>,
}

impl FactoryBindInfo {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_provider_factory(&mut self, factory: ProviderFactory) {
    self.provider_factory = Some(factory);
  }

  pub(crate) fn into_provider_factory(self) -> Option<ProviderFactory> {
    self.provider_factory
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Shape: Send + Sync {
    fn sides(&self) -> u32;
  }
  struct Square;
  impl Shape for Square {
    fn sides(&self) -> u32 {
      4
    }
  }

  #[test]
  fn test_contract_cast_converts_the_concrete_instance() {
    let contract = Contract::with_cast::<Square, dyn Shape>(|square| square);
    let square = Arc::new(Square);

    let converted = contract.apply(Instance::new(square)).unwrap();
    let shape = converted.downcast::<dyn Shape>().unwrap();

    assert_eq!(shape.sides(), 4);
    assert_eq!(contract.contract_type(), ContractType::of::<dyn Shape>());
  }

  #[test]
  fn test_identity_contract_rejects_foreign_instances() {
    let contract = Contract::of::<Square>();
    let err = contract.apply(Instance::new(Arc::new(5_u32))).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
  }

  #[test]
  fn test_check_reports_recorded_problems() {
    let mut info = BindInfo::new(Contract::of::<Square>());
    assert!(info.check().is_ok());

    info.add_contract(Contract::of::<Square>());
    let err = info.check().unwrap_err();
    assert!(err.to_string().contains("listed more than once"));

    let unit = BindInfo::new(Contract::of::<()>());
    assert!(matches!(
      unit.check(),
      Err(Error::InvalidConfiguration { .. })
    ));

    assert!(BindInfo::default().check().is_err());
  }

  #[test]
  fn test_without_copy_keeps_everything_else() {
    let mut info = BindInfo::new(Contract::of::<Square>());
    info.set_copy_mode(CopyMode::DirectSubContainers);
    info.set_scope(Scope::Cached);
    info.set_identifier(Some("main".into()));

    let copy = info.without_copy();
    assert_eq!(copy.copy_mode(), CopyMode::None);
    assert_eq!(copy.scope(), Scope::Cached);
    assert_eq!(copy.identifier(), Some(&Identifier::from("main")));
  }
}
