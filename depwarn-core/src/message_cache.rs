use crate::{CallSite, SharedStr};
use dashmap::DashSet;
use std::sync::Arc;
use tracing::trace;

/// Identity of a deprecation notice: who raised it, from where, with what text.
///
/// The message is the raw text handed to the emitter, not the formatted output
/// line, so checking the cache never requires formatting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NoticeKey {
    pub namespace: Arc<str>,
    pub site: CallSite,
    pub message: SharedStr,
}

impl NoticeKey {
    pub fn new(namespace: Arc<str>, site: CallSite, message: impl Into<SharedStr>) -> Self {
        Self {
            namespace,
            site,
            message: message.into(),
        }
    }
}

/// Records which notices have already been handled.
///
/// The cache is a concurrent set with "first writer wins" insertion: when two
/// threads hit the same call site for the first time, exactly one of them is
/// told to emit. Entries are never evicted; the set grows with the number of
/// distinct (namespace, call site, message) triples actually exercised.
///
/// # Examples
///
/// ```
/// use depwarn_core::{CallSite, MessageCache, NoticeKey};
/// use std::sync::Arc;
///
/// let cache = MessageCache::new();
/// let key = NoticeKey::new(Arc::from("my-lib"), CallSite::new("src/app.rs", 3, 9), "old");
///
/// assert!(cache.should_emit(&key, false));
/// assert!(!cache.should_emit(&key, false));
///
/// // trace mode reports every occurrence
/// assert!(cache.should_emit(&key, true));
/// ```
#[derive(Debug, Default)]
pub struct MessageCache {
    seen: DashSet<NoticeKey>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Returns `true` exactly once per distinct key, or always when `traced`.
    ///
    /// Traced lookups do not record the key.
    pub fn should_emit(&self, key: &NoticeKey, traced: bool) -> bool {
        if traced {
            return true;
        }

        // read-only probe first, the common case is a repeat
        if self.seen.contains(key) {
            return false;
        }

        let first = self.seen.insert(key.clone());
        if first {
            trace!(
                namespace = %key.namespace,
                site = %key.site,
                "recorded first occurrence of deprecation notice"
            );
        }
        first
    }

    pub fn contains(&self, key: &NoticeKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of recorded notices.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Snapshot of the recorded keys, in no particular order.
    pub fn keys(&self) -> Vec<NoticeKey> {
        self.seen.iter().map(|entry| entry.key().clone()).collect()
    }
}
