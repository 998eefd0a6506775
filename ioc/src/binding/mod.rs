//! Binding records and the fluent binder chain that fills them.

mod bind_info;
mod binders;
mod factory_binders;

pub use bind_info::{
  BindInfo, Caster, Condition, Contract, CopyMode, FactoryBindInfo, InstantiatedCallback,
  ProviderFactory, Scope,
};
pub use binders::{ConcreteBinder, ConditionBinder, FromBinder, ScopeConditionBinder};
pub use factory_binders::{FactoryConditionBinder, FactoryFromBinder, FactoryToBinder};
