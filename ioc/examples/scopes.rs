use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zenject::{Container, Injectable, Injector, Result};

// A simple service to track instances.
struct RequestTracker {
  id: usize,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn new_tracker() -> RequestTracker {
  let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
  println!("-> Creating new RequestTracker with id: {}", id);
  RequestTracker { id }
}

impl Injectable for RequestTracker {
  fn construct(_: &mut Injector<'_>) -> Result<Self> {
    Ok(new_tracker())
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();

  // --- Cached scope ---
  // One instance per binding, built on first use.
  container
    .bind::<RequestTracker>()
    .with_id("cached")
    .from_method(|_| Ok(Arc::new(new_tracker())))
    .as_cached()
    .finish()?;

  // --- Transient scope ---
  // The method runs again on every request.
  container
    .bind::<RequestTracker>()
    .with_id("transient")
    .from_method(|_| Ok(Arc::new(new_tracker())))
    .as_transient()
    .finish()?;

  println!("\nResolving cached service twice...");
  let cached1 = container.resolve_id::<RequestTracker>("cached")?;
  let cached2 = container.resolve_id::<RequestTracker>("cached")?;
  println!("Cached 1 ID: {}, Cached 2 ID: {}", cached1.id, cached2.id);
  assert_eq!(cached1.id, cached2.id);
  assert!(Arc::ptr_eq(&cached1, &cached2));

  println!("\nResolving transient service twice...");
  let transient1 = container.resolve_id::<RequestTracker>("transient")?;
  let transient2 = container.resolve_id::<RequestTracker>("transient")?;
  println!("Transient 1 ID: {}, Transient 2 ID: {}", transient1.id, transient2.id);
  assert_ne!(transient1.id, transient2.id);

  // --- Single scope ---
  // Bindings that build the same concrete type share one instance, across sub-containers.
  let scene = container.create_sub_container()?;
  container
    .bind::<RequestTracker>()
    .with_id("single")
    .from_new()
    .as_single()
    .finish()?;
  scene
    .bind::<RequestTracker>()
    .with_id("scene-single")
    .from_new()
    .as_single()
    .finish()?;

  // A method cannot join a slot created by from_new.
  let rejected = scene
    .bind::<RequestTracker>()
    .with_id("method-single")
    .from_method(|_| Ok(Arc::new(new_tracker())))
    .as_single()
    .finish();
  println!("\nSingle from a method on top of from_new: {}", rejected.is_err());
  assert!(rejected.is_err());

  println!("\nResolving single services from two containers...");
  let single1 = container.resolve_id::<RequestTracker>("single")?;
  let single2 = scene.resolve_id::<RequestTracker>("scene-single")?;
  println!("Single 1 ID: {}, Single 2 ID: {}", single1.id, single2.id);
  assert!(Arc::ptr_eq(&single1, &single2));

  println!("\nScopes behave as expected.");
  Ok(())
}
