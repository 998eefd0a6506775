//! The process-wide project container.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access.
static PROJECT_CONTAINER: Lazy<Container> = Lazy::new(Container::new);

/// The root container shared by the whole process.
///
/// Scene or request containers are usually created from it with
/// [`Container::create_sub_container`].
///
/// # Examples
///
/// ```
/// use zenject::project;
///
/// project()
///   .bind_instance(String::from("Hello from the project container!"))
///   .with_id("motd")
///   .finish()
///   .unwrap();
///
/// assert!(project().has_binding_id::<String>("motd"));
/// ```
pub fn project() -> &'static Container {
  &PROJECT_CONTAINER
}
