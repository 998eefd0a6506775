use pretty_assertions::assert_eq;
use std::sync::Arc;
use zenject::{
  Container, Error, Injectable, InjectableMember, Injector, Result, ScopeConditionBinder,
};

// --- Fixtures ---

trait Handler: Send + Sync {
  fn name(&self) -> &'static str;
}

struct ClickHandler;
impl Handler for ClickHandler {
  fn name(&self) -> &'static str {
    "click"
  }
}

struct KeyHandler;
impl Handler for KeyHandler {
  fn name(&self) -> &'static str {
    "key"
  }
}

struct Storage {
  path: &'static str,
}

struct Uploader {
  storage: Arc<Storage>,
}

impl Injectable for Uploader {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Storage>("storage")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Uploader {
      storage: injector.inject(&InjectableMember::of::<Storage>("storage"))?,
    })
  }
}

struct Archiver {
  storage: Arc<Storage>,
}

impl Injectable for Archiver {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Storage>("storage")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Archiver {
      storage: injector.resolve()?,
    })
  }
}

struct Dispatcher {
  handlers: Vec<Arc<dyn Handler>>,
}

impl Injectable for Dispatcher {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<dyn Handler>("handlers").collection()]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    Ok(Dispatcher {
      handlers: injector.all()?,
    })
  }
}

fn bind_handlers(container: &Container) {
  container
    .bind::<dyn Handler>()
    .to::<ClickHandler>(|h| h)
    .from_instance(ClickHandler)
    .finish()
    .unwrap();
  container
    .bind::<dyn Handler>()
    .to::<KeyHandler>(|h| h)
    .from_instance(KeyHandler)
    .finish()
    .unwrap();
}

fn storage<'a>(container: &'a Container, path: &'static str) -> ScopeConditionBinder<'a, Storage, Storage> {
  container.bind_instance(Storage { path })
}

// --- Tests ---

#[test]
fn test_two_unconditioned_handlers_are_ambiguous() {
  // Arrange
  let container = Container::new();
  bind_handlers(&container);

  // Act
  let single = container.resolve::<dyn Handler>();
  let all = container.resolve_all::<dyn Handler>().unwrap();

  // Assert
  match single {
    Err(Error::Ambiguous { matches, .. }) => assert_eq!(matches, 2),
    Err(other) => panic!("Expected Ambiguous, got {:?}", other),
    Ok(_) => panic!("Expected Ambiguous, got an instance"),
  }
  let names: Vec<&str> = all.iter().map(|h| h.name()).collect();
  assert_eq!(names, vec!["click", "key"]);
}

#[test]
fn test_collection_members_receive_every_handler() {
  let container = Container::new();
  bind_handlers(&container);
  container.bind::<Dispatcher>().finish().unwrap();

  let dispatcher = container.resolve::<Dispatcher>().unwrap();
  assert_eq!(dispatcher.handlers.len(), 2);
}

#[test]
fn test_required_collection_with_no_bindings_fails() {
  let container = Container::new();
  container.bind::<Dispatcher>().finish().unwrap();

  let err = container.resolve::<Dispatcher>().err().unwrap();
  assert!(err.is_not_found());
}

#[test]
fn test_when_injected_into_selects_per_consumer() {
  // Arrange
  let container = Container::new();
  storage(&container, "/uploads")
    .when_injected_into::<Uploader>()
    .finish()
    .unwrap();
  storage(&container, "/archive")
    .when_injected_into::<Archiver>()
    .finish()
    .unwrap();
  container.bind::<Uploader>().finish().unwrap();
  container.bind::<Archiver>().finish().unwrap();

  // Act
  let uploader = container.resolve::<Uploader>().unwrap();
  let archiver = container.resolve::<Archiver>().unwrap();

  // Assert
  assert_eq!(uploader.storage.path, "/uploads");
  assert_eq!(archiver.storage.path, "/archive");
  // A direct request matches neither condition.
  assert!(container.resolve::<Storage>().err().unwrap().is_not_found());
}

#[test]
fn test_matching_condition_takes_precedence_over_unconditioned() {
  // Arrange
  let container = Container::new();
  storage(&container, "/default").finish().unwrap();
  storage(&container, "/uploads")
    .when_injected_into::<Uploader>()
    .finish()
    .unwrap();
  container.bind::<Uploader>().finish().unwrap();
  container.bind::<Archiver>().finish().unwrap();

  // Act
  let uploader = container.resolve::<Uploader>().unwrap();
  let archiver = container.resolve::<Archiver>().unwrap();

  // Assert
  assert_eq!(uploader.storage.path, "/uploads");
  assert_eq!(archiver.storage.path, "/default");
}

#[test]
fn test_first_registered_condition_wins_when_several_match() {
  let container = Container::new();
  storage(&container, "/first").when(|_| true).finish().unwrap();
  storage(&container, "/second").when(|_| true).finish().unwrap();

  let resolved = container.resolve::<Storage>().unwrap();
  assert_eq!(resolved.path, "/first");
}

#[test]
fn test_when_not_injected_into_excludes_a_consumer() {
  let container = Container::new();
  storage(&container, "/shared")
    .when_not_injected_into::<Archiver>()
    .finish()
    .unwrap();
  container.bind::<Uploader>().finish().unwrap();
  container.bind::<Archiver>().finish().unwrap();

  assert_eq!(container.resolve::<Uploader>().unwrap().storage.path, "/shared");
  assert!(container.resolve::<Archiver>().err().unwrap().is_not_found());
}

#[test]
fn test_conditions_see_identifiers_and_member_names() {
  let container = Container::new();
  storage(&container, "/named")
    .when(|ctx| ctx.member_name() == Some("storage"))
    .finish()
    .unwrap();
  container.bind::<Uploader>().finish().unwrap();

  assert_eq!(container.resolve::<Uploader>().unwrap().storage.path, "/named");
  assert!(container.try_resolve::<Storage>().unwrap().is_none());
}

#[test]
fn test_failed_resolution_leaves_the_registry_usable() {
  let container = Container::new();
  bind_handlers(&container);
  assert!(container.resolve::<dyn Handler>().is_err());

  container
    .bind::<dyn Handler>()
    .with_id("primary")
    .to::<KeyHandler>(|h| h)
    .from_instance(KeyHandler)
    .finish()
    .unwrap();

  assert_eq!(container.resolve_id::<dyn Handler>("primary").unwrap().name(), "key");
  assert_eq!(container.resolve_all::<dyn Handler>().unwrap().len(), 2);
}
