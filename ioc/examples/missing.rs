use std::panic;
use tracing_subscriber::EnvFilter;
use zenject::{project, resolve, ContainerSettings, Injectable, InjectableMember, Injector, Result};

struct UnregisteredService;

struct Config;

struct Mailer;

impl Injectable for Mailer {
  fn dependencies() -> Vec<InjectableMember> {
    vec![InjectableMember::of::<Config>("config")]
  }

  fn construct(injector: &mut Injector<'_>) -> Result<Self> {
    injector.resolve::<Config>()?;
    Ok(Mailer)
  }
}

fn main() {
  // RUST_LOG=zenject=debug shows registrations and validation problems.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never bound...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(UnregisteredService);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible methods ---
  println!("\nNow resolving through `try_resolve()` and `resolve()`...");

  match project().try_resolve::<UnregisteredService>() {
    Ok(None) => println!("Correctly received `None` for the missing service."),
    Ok(Some(_)) => panic!("Should not have found the service!"),
    Err(e) => panic!("Unexpected error: {}", e),
  }

  project().bind::<Mailer>().from_new().non_lazy().finish().unwrap();
  match project().resolve::<Mailer>() {
    Err(e) => println!("Resolving the mailer failed as expected: {}", e),
    Ok(_) => panic!("The mailer has no config to build from!"),
  }

  // --- Validation finds the same problem without building anything ---
  let settings = ContainerSettings::from_yaml_str("validation:\n  error_response: fail\n").unwrap();
  let strict = zenject::Container::with_settings(settings);
  strict.bind::<Mailer>().from_new().non_lazy().finish().unwrap();
  match strict.validate() {
    Err(e) => println!("\n{}", e),
    Ok(()) => panic!("Validation should have reported the missing config."),
  }
}
