//! # Depwarn
//!
//! Runtime deprecation notices for library authors.
//!
//! A deprecated function or property raises a notice on standard error the
//! first time it is used from each call site. Repeated use from the same place
//! is silent, so hot loops are not flooded and the cost of a repeat is a single
//! set lookup.
//!
//! ## Features
//!
//! - **Once per call site**: notices are keyed by (namespace, file:line:column, message)
//! - **Precise locations**: call sites come from `#[track_caller]`, no stack walking
//! - **Namespace control**: `NO_DEPRECATION` silences namespaces, `TRACE_DEPRECATION`
//!   reports every occurrence with a backtrace
//! - **Wrappers**: deprecate closures, functions and properties without touching them
//! - **Attribute macro**: `#[deprecate(namespace = "...")]` on functions and methods
//! - **Thread-safe**: concurrent first calls from the same site emit exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use depwarn::deprecate;
//!
//! #[deprecate(namespace = "my-lib", message = "old_sum() is deprecated, use sum()")]
//! pub fn old_sum(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! // The first call prints a notice, the others from the same line do not
//! for _ in 0..3 {
//!     assert_eq!(old_sum(1, 2), 3);
//! }
//! ```
//!
//! ## Emitters and Wrappers
//!
//! ```rust
//! let deprecate = depwarn::emitter("my-lib").unwrap();
//!
//! // Direct notice
//! #[track_caller]
//! fn legacy_init(deprecate: &depwarn::Emitter) {
//!     deprecate.deprecate("legacy_init() is deprecated");
//! }
//! legacy_init(&deprecate);
//!
//! // Wrapped function: arguments are passed as a tuple
//! let add = deprecate.wrap_fn(|a: i32, b: i32| a + b, "add() is deprecated");
//! assert_eq!(add.call((2, 3)), 5);
//!
//! // Deprecated property
//! let retries = deprecate.property("retries", 3u32, "retries is deprecated");
//! assert_eq!(*retries.get(), 3);
//! ```
//!
//! ## Configuration
//!
//! ```text
//! NO_DEPRECATION=my-lib,other-lib    # silence these namespaces
//! NO_DEPRECATION=*                   # silence everything
//! TRACE_DEPRECATION=my-lib           # report every call, with a backtrace
//! ```
//!
//! The environment is read once, when the global registry is first used.
//! Tests and embedders that need isolation can build their own
//! [`Registry`] with [`Registry::builder`].

pub use depwarn_core::*;
pub use depwarn_macros::deprecate;

/// Paths used by the code `#[deprecate]` generates. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use depwarn_core::{ActiveSiteGuard, Emitter};
}

/// Create an emitter for `namespace` on the global registry
///
/// # Errors
///
/// Returns [`DeprecateError::MissingNamespace`] if `namespace` is blank.
///
/// # Examples
///
/// ```rust
/// let deprecate = depwarn::emitter("my-lib").unwrap();
/// assert_eq!(deprecate.namespace(), "my-lib");
///
/// assert!(depwarn::emitter("").is_err());
/// ```
pub fn emitter(namespace: &str) -> Result<Emitter, DeprecateError> {
    Registry::global().emitter(namespace)
}

/// Silence every deprecation notice of the process
///
/// Applies immediately, including to emitters that already exist.
pub fn disable_all() {
    Registry::global().disable_all()
}

/// Undo [`disable_all`]
pub fn enable_all() {
    Registry::global().enable_all()
}

/// Whether the global registry currently emits notices
pub fn is_enabled() -> bool {
    Registry::global().is_enabled()
}
