//! Statistics lookup on the process-wide registry.
//!
//! Shortcuts for [`Registry::stats`], [`Registry::namespaces`] and
//! [`Registry::reset_stats`] on [`Registry::global`].
//!
//! # Examples
//!
//! ```
//! use depwarn_core::stats_registry;
//!
//! if let Some(stats) = stats_registry::get("my-lib") {
//!     println!("Emitted: {}", stats.emitted());
//!     println!("Repeated: {}", stats.repeated());
//! }
//!
//! for namespace in stats_registry::list() {
//!     println!("Namespace: {}", namespace);
//! }
//! ```

use crate::{NoticeStats, Registry};

/// Snapshot of the counters of `namespace`, if an emitter exists for it.
pub fn get(namespace: &str) -> Option<NoticeStats> {
    Registry::global().stats(namespace)
}

/// Namespaces with an emitter on the global registry.
pub fn list() -> Vec<String> {
    Registry::global().namespaces()
}

/// Resets the counters of `namespace`. Returns `false` if it is unknown.
pub fn reset(namespace: &str) -> bool {
    Registry::global().reset_stats(namespace)
}
