//! # Depwarn Core
//!
//! Core types for the depwarn deprecation library.
//!
//! Raising a notice goes through three steps:
//!
//! 1. **Suppression**: the namespace mode (emit, suppress, trace) and the
//!    registry switch are checked first; suppressed calls do no other work.
//! 2. **Call-site resolution**: the consumer location, provided by
//!    `#[track_caller]`, is turned into a [`CallSite`] by the registry's
//!    [`FrameResolver`] and memoized.
//! 3. **Message cache**: the (namespace, call site, message) triple is looked
//!    up; only its first occurrence is formatted and written to the sink.
//!
//! ## Module Organization
//!
//! - [`call_site`] - call-site descriptors, resolvers and the active-site guard
//! - [`message_cache`] - first-occurrence tracking
//! - [`suppression`] - `NO_DEPRECATION` / `TRACE_DEPRECATION` policy
//! - [`registry`] - the shared store and emitter factory
//! - [`wrap`] - deprecated callables and properties
//! - [`notice`] / [`sink`] - notice formatting and output
//!
mod emitter;
mod error;
mod shared_str;

pub mod call_site;
pub mod message_cache;
pub mod notice;
pub mod registry;
pub mod sink;
pub mod suppression;
pub mod wrap;

#[cfg(feature = "stats")]
mod stats;

#[cfg(feature = "stats")]
pub mod stats_registry;

pub use call_site::{
    ActiveSiteGuard, CallSite, CallerResolver, FrameResolver, SiteCache, UnavailableResolver,
};
pub use emitter::Emitter;
pub use error::DeprecateError;
pub use message_cache::{MessageCache, NoticeKey};
pub use notice::DeprecationNotice;
pub use registry::{Listener, Registry, RegistryBuilder};
pub use shared_str::SharedStr;
pub use sink::{MemorySink, Sink, StderrSink, TracingSink};
pub use suppression::{NamespaceMode, SuppressionConfig};
pub use wrap::{Callable, DeprecatedFn, DeprecatedProperty, PropertyMap};

#[cfg(feature = "stats")]
pub use stats::NoticeStats;
