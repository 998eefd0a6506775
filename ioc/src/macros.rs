//! Public macros for resolving from the project container.

/// Resolves a dependency from the [project container](crate::project).
///
/// # Panics
///
/// Panics with the resolution error if the dependency cannot be resolved. Use
/// `project().resolve::<T>()` to handle the error instead.
///
/// # Examples
///
/// ```
/// use zenject::{project, resolve};
///
/// project().bind_instance(42_u32).with_id("answer").finish().unwrap();
///
/// let answer = resolve!(u32, "answer");
/// assert_eq!(*answer, 42);
/// ```
///
/// ```
/// use zenject::{project, resolve};
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct English;
/// impl Greeter for English { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// project()
///   .bind::<dyn Greeter>()
///   .to::<English>(|english| english)
///   .from_instance(English)
///   .with_id("doc")
///   .finish()
///   .unwrap();
///
/// let greeter = resolve!(trait Greeter, "doc");
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
    // The trait arms come first: `trait X` does not parse as a type.
    (trait $trait_ident:ident) => {
        $crate::project()
            .resolve::<dyn $trait_ident>()
            .unwrap_or_else(|e| panic!("Failed to resolve required service: {}", e))
    };

    (trait $trait_ident:ident, $id:expr) => {
        $crate::project()
            .resolve_id::<dyn $trait_ident>($id)
            .unwrap_or_else(|e| panic!("Failed to resolve required service: {}", e))
    };

    ($type:ty) => {
        $crate::project()
            .resolve::<$type>()
            .unwrap_or_else(|e| panic!("Failed to resolve required service: {}", e))
    };

    ($type:ty, $id:expr) => {
        $crate::project()
            .resolve_id::<$type>($id)
            .unwrap_or_else(|e| panic!("Failed to resolve required service: {}", e))
    };
}

/// Like [`resolve!`], but yields `None` when nothing is bound for the request.
///
/// # Panics
///
/// Panics if a binding exists but resolving it fails.
///
/// # Examples
///
/// ```
/// use zenject::maybe_resolve;
///
/// struct Unbound;
/// assert!(maybe_resolve!(Unbound).is_none());
/// ```
#[macro_export]
macro_rules! maybe_resolve {
    (trait $trait_ident:ident) => {
        $crate::project()
            .try_resolve::<dyn $trait_ident>()
            .unwrap_or_else(|e| panic!("Failed to resolve service: {}", e))
    };

    (trait $trait_ident:ident, $id:expr) => {
        $crate::project()
            .try_resolve_id::<dyn $trait_ident>($id)
            .unwrap_or_else(|e| panic!("Failed to resolve service: {}", e))
    };

    ($type:ty) => {
        $crate::project()
            .try_resolve::<$type>()
            .unwrap_or_else(|e| panic!("Failed to resolve service: {}", e))
    };

    ($type:ty, $id:expr) => {
        $crate::project()
            .try_resolve_id::<$type>($id)
            .unwrap_or_else(|e| panic!("Failed to resolve service: {}", e))
    };
}
