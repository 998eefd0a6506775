use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zenject::{
  Container, ContainerSettings, Error, Injectable, InjectableMember, Injector, Result,
  RootResolveMethod, ValidationErrorResponse,
};

// --- Fixtures ---

// Counts Repository constructions; tests reading it run serially.
static BUILT: AtomicUsize = AtomicUsize::new(0);

struct Config;

struct Repository {
  _config: Arc<Config>,
}

impl Injectable for Repository {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Config>("config")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    BUILT.fetch_add(1, Ordering::SeqCst);
    Ok(Repository {
      _config: injector.resolve()?,
    })
  }
}

struct Ping {
  _pong: Arc<Pong>,
}
struct Pong {
  _ping: Arc<Ping>,
}

impl Injectable for Ping {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Pong>("pong")]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Ping { _pong: injector.resolve()? })
  }
}

impl Injectable for Pong {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Ping>("ping")]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Pong { _ping: injector.resolve()? })
  }
}

struct Tolerant;

impl Injectable for Tolerant {
  fn dependencies() -> Vec<InjectableMember> {
    vec![
      InjectableMember::of::<Config>("config").optional(),
      InjectableMember::of::<Ping>("ping").lazy(),
    ]
  }
  fn construct(_: &mut Injector<'_>) -> Result<Self> {
    Ok(Tolerant)
  }
}

fn failing_container(method: RootResolveMethod) -> Container {
  let settings = ContainerSettings::default()
    .with_validation_error_response(ValidationErrorResponse::Fail)
    .with_root_resolve_method(method);
  Container::with_settings(settings)
}

// --- Tests ---

#[test]
#[serial]
fn test_validation_reports_missing_dependencies_without_building() {
  // Arrange
  let container = failing_container(RootResolveMethod::NonLazyOnly);
  container.bind::<Repository>().from_new().non_lazy().finish().unwrap();
  let before = BUILT.load(Ordering::SeqCst);

  // Act
  let result = container.validate();

  // Assert
  match result {
    Err(Error::Validation(errors)) => {
      assert_eq!(errors.len(), 1);
      assert!(errors[0].is_not_found());
    }
    other => panic!("Expected Validation, got {:?}", other),
  }
  assert_eq!(BUILT.load(Ordering::SeqCst), before);
}

#[test]
fn test_validation_reports_cycles_and_ambiguity() {
  // Arrange
  let container = failing_container(RootResolveMethod::All);
  container.bind::<Ping>().finish().unwrap();
  container.bind::<Pong>().finish().unwrap();
  container.bind_instance(Config).with_id("a").finish().unwrap();
  container.bind_instance(Config).finish().unwrap();
  container.bind_instance(Config).finish().unwrap();
  container.bind::<Repository>().finish().unwrap();

  // Act
  let errors = container.validation_errors();

  // Assert
  let cycles = errors
    .iter()
    .filter(|e| matches!(e, Error::CircularDependency { .. }))
    .count();
  let ambiguous = errors
    .iter()
    .filter(|e| matches!(e, Error::Ambiguous { .. }))
    .count();
  assert_eq!(cycles, 2);
  assert_eq!(ambiguous, 1);
  assert!(matches!(container.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_validation_sees_the_same_conditions_as_an_alias_at_runtime() {
  // Arrange
  let container = failing_container(RootResolveMethod::NonLazyOnly);
  container
    .bind::<Config>()
    .from_resolve_id("real")
    .non_lazy()
    .finish()
    .unwrap();
  container
    .bind_instance(Config)
    .with_id("real")
    .when_not_injected_into::<Config>()
    .finish()
    .unwrap();

  // Act & Assert
  assert!(container.resolve::<Config>().is_ok());
  assert!(container.validation_errors().is_empty());
  assert!(container.validate().is_ok());
}

#[test]
fn test_validation_records_the_constructed_type_on_members() {
  let container = failing_container(RootResolveMethod::All);
  container
    .bind_instance(Config)
    .when_injected_into::<Repository>()
    .finish()
    .unwrap();
  container.bind::<Repository>().finish().unwrap();

  assert!(container.validate().is_ok());
}

#[test]
fn test_non_lazy_only_skips_other_bindings() {
  let container = failing_container(RootResolveMethod::NonLazyOnly);
  container.bind::<Repository>().finish().unwrap();

  assert!(container.validation_errors().is_empty());
  assert!(container.validate().is_ok());
}

#[test]
fn test_optional_and_lazy_members_are_not_problems() {
  let container = failing_container(RootResolveMethod::All);
  container.bind::<Tolerant>().finish().unwrap();

  assert!(container.validate().is_ok());
}

#[test]
fn test_log_response_succeeds_despite_problems() {
  let container = Container::new();
  container.bind::<Repository>().from_new().non_lazy().finish().unwrap();

  assert_eq!(container.validation_errors().len(), 1);
  assert!(container.validate().is_ok());
}

#[test]
#[serial]
fn test_resolve_roots_builds_non_lazy_bindings() {
  // Arrange
  let container = Container::new();
  container.bind_instance(Config).finish().unwrap();
  container
    .bind::<Repository>()
    .from_new()
    .as_cached()
    .non_lazy()
    .finish()
    .unwrap();
  let before = BUILT.load(Ordering::SeqCst);

  // Act
  container.resolve_roots().unwrap();
  container.resolve::<Repository>().unwrap();

  // Assert
  assert_eq!(BUILT.load(Ordering::SeqCst), before + 1);
}
