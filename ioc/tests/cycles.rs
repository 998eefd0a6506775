use std::num::NonZeroUsize;
use std::sync::Arc;
use zenject::{
  Container, ContainerSettings, Error, Injectable, InjectableMember, Injector, Lazy, Result,
};

// --- Fixtures ---

// A and B depend on each other directly.
struct A {
  _b: Arc<B>,
}
struct B {
  _a: Arc<A>,
}

impl Injectable for A {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<B>("b")]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(A { _b: injector.resolve()? })
  }
}

impl Injectable for B {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<A>("a")]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(B { _a: injector.resolve()? })
  }
}

trait Node: Send + Sync {}
struct Leaf;
impl Node for Leaf {}

// Parent and Child break their cycle with a lazy member.
struct Parent {
  child: Arc<Child>,
}
struct Child {
  parent: Lazy<Parent>,
}

impl Injectable for Parent {
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Parent {
      child: injector.resolve()?,
    })
  }
}

impl Injectable for Child {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Parent>("parent").lazy()]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Child {
      parent: injector.lazy(),
    })
  }
}

// Asks for itself through a lazy handle while it is being built.
struct Impatient;
impl Injectable for Impatient {
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    let me = injector.lazy::<Impatient>();
    me.get()?;
    Ok(Impatient)
  }
}

trait Service: Send + Sync {
  fn describe(&self) -> String;
}

struct RealService;
impl Service for RealService {
  fn describe(&self) -> String {
    "real".to_string()
  }
}
impl Injectable for RealService {
  fn construct(_: &mut Injector<'_>) -> Result<Self> {
    Ok(RealService)
  }
}

// Decorates whichever `Service` is bound for it.
struct LoggingService {
  inner: Arc<dyn Service>,
}
impl Service for LoggingService {
  fn describe(&self) -> String {
    format!("logging({})", self.inner.describe())
  }
}
impl Injectable for LoggingService {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<dyn Service>("inner")]
  }
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(LoggingService {
      inner: injector.resolve()?,
    })
  }
}

struct Level1 {
  _next: Arc<Level2>,
}
struct Level2 {
  _next: Arc<Level3>,
}
struct Level3;

impl Injectable for Level1 {
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Level1 { _next: injector.resolve()? })
  }
}
impl Injectable for Level2 {
  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Level2 { _next: injector.resolve()? })
  }
}
impl Injectable for Level3 {
  fn construct(_: &mut Injector<'_>) -> Result<Self> {
    Ok(Level3)
  }
}

// --- Tests ---

#[test]
fn test_direct_cycle_is_reported() {
  // Arrange
  let container = Container::new();
  container.bind::<A>().finish().unwrap();
  container.bind::<B>().finish().unwrap();

  // Act
  let result = container.resolve::<A>();

  // Assert
  match result {
    Err(Error::CircularDependency { chain }) => {
      let a = std::any::type_name::<A>();
      let b = std::any::type_name::<B>();
      assert_eq!(chain, format!("{} -> {} -> {}", a, b, a));
    }
    Err(other) => panic!("Expected CircularDependency, got {:?}", other),
    Ok(_) => panic!("Expected CircularDependency, got an instance"),
  }
}

#[test]
fn test_cached_cycle_is_reported_too() {
  let container = Container::new();
  container.bind::<A>().from_new().as_cached().finish().unwrap();
  container.bind::<B>().from_new().as_single().finish().unwrap();

  assert!(matches!(
    container.resolve::<B>(),
    Err(Error::CircularDependency { .. })
  ));
  // The failed attempt left nothing half-built behind.
  assert!(matches!(
    container.resolve::<A>(),
    Err(Error::CircularDependency { .. })
  ));
}

#[test]
fn test_self_alias_is_a_cycle() {
  // Arrange
  let container = Container::new();
  container.bind::<dyn Node>().from_resolve().finish().unwrap();

  // Act & Assert
  match container.resolve::<dyn Node>() {
    Err(Error::CircularDependency { chain }) => {
      let node = std::any::type_name::<dyn Node>();
      assert_eq!(chain, format!("{} -> {}", node, node));
    }
    Err(other) => panic!("Expected CircularDependency, got {:?}", other),
    Ok(_) => panic!("Expected CircularDependency, got an instance"),
  }
}

#[test]
fn test_alias_to_another_identifier_is_not_a_cycle() {
  let container = Container::new();
  container
    .bind::<dyn Node>()
    .with_id("leaf")
    .to::<Leaf>(|leaf| leaf)
    .from_instance(Leaf)
    .finish()
    .unwrap();
  container.bind::<dyn Node>().from_resolve_id("leaf").finish().unwrap();

  let aliased = container.resolve::<dyn Node>().unwrap();
  let direct = container.resolve_id::<dyn Node>("leaf").unwrap();
  assert!(Arc::ptr_eq(&aliased, &direct));
}

#[test]
fn test_lazy_member_breaks_a_cycle() {
  // Arrange
  let container = Container::new();
  container.bind::<Parent>().from_new().as_cached().finish().unwrap();
  container.bind::<Child>().from_new().as_cached().finish().unwrap();

  // Act
  let parent = container.resolve::<Parent>().unwrap();

  // Assert
  assert!(!parent.child.parent.is_resolved());
  let back = parent.child.parent.get().unwrap();
  assert!(Arc::ptr_eq(&parent, &back));
  assert!(parent.child.parent.is_resolved());
}

#[test]
fn test_lazy_self_request_during_creation_is_a_cycle() {
  let container = Container::new();
  container.bind::<Impatient>().from_new().as_cached().finish().unwrap();

  let result = container.resolve::<Impatient>();
  assert!(matches!(result, Err(Error::CircularDependency { .. })));
}

#[test]
fn test_lazy_after_container_drop_is_disposed() {
  let container = Container::new();
  container.bind_instance(Leaf).finish().unwrap();
  let lazy = container.lazy::<Leaf>();

  drop(container);
  assert!(matches!(lazy.get(), Err(Error::ContainerDisposed)));
}

#[test]
fn test_conditional_decorator_is_not_a_false_cycle() {
  // Arrange
  let container = Container::new();
  container
    .bind::<dyn Service>()
    .to::<LoggingService>(|s| s)
    .from_new()
    .when_not_injected_into::<LoggingService>()
    .finish()
    .unwrap();
  container
    .bind::<dyn Service>()
    .to::<RealService>(|s| s)
    .from_new()
    .when_injected_into::<LoggingService>()
    .finish()
    .unwrap();

  // Act
  let service = container.resolve::<dyn Service>().unwrap();

  // Assert
  assert_eq!(service.describe(), "logging(real)");
}

#[test]
fn test_depth_limit_is_enforced() {
  // Arrange
  let settings =
    ContainerSettings::default().with_max_resolve_depth(NonZeroUsize::new(2).unwrap());
  let container = Container::with_settings(settings);
  container.bind::<Level1>().finish().unwrap();
  container.bind::<Level2>().finish().unwrap();
  container.bind::<Level3>().finish().unwrap();

  // Act
  let deep = container.resolve::<Level1>();
  let shallow = container.resolve::<Level2>();

  // Assert
  assert!(matches!(deep, Err(Error::DepthExceeded { max_depth: 2, .. })));
  assert!(shallow.is_ok());
}
