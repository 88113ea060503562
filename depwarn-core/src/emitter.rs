use crate::call_site::effective_caller;
use crate::wrap::{DeprecatedFn, DeprecatedProperty, PropertyMap};
use crate::{DeprecateError, DeprecationNotice, NamespaceMode, NoticeKey, Registry, SharedStr};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

#[cfg(feature = "stats")]
use crate::NoticeStats;

/// Per-namespace handle for raising deprecation notices.
///
/// Obtained from [`Registry::emitter`] (or [`Emitter::global`]). Cloning is
/// cheap; clones share the namespace, mode and registry.
///
/// Every entry point that raises a notice is `#[track_caller]`: the reported
/// call site is the first frame up the stack that is not itself
/// `#[track_caller]`. Library authors should therefore mark their own
/// deprecated functions `#[track_caller]` so the notice points at the
/// consumer's code rather than at the library.
///
/// # Examples
///
/// ```
/// use depwarn_core::{MemorySink, Registry};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
/// let deprecate = registry.emitter("my-lib").unwrap();
///
/// #[track_caller]
/// fn old_api(deprecate: &depwarn_core::Emitter) -> u32 {
///     deprecate.deprecate("old_api() is deprecated, use new_api()");
///     7
/// }
///
/// for _ in 0..5 {
///     assert_eq!(old_api(&deprecate), 7);
/// }
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Clone)]
pub struct Emitter {
    namespace: Arc<str>,
    mode: NamespaceMode,
    registry: Arc<Registry>,
    #[cfg(feature = "stats")]
    stats: Arc<NoticeStats>,
}

impl Emitter {
    pub(crate) fn new(registry: Arc<Registry>, namespace: Arc<str>, mode: NamespaceMode) -> Self {
        Self {
            #[cfg(feature = "stats")]
            stats: registry.stats_for(&namespace),
            namespace,
            mode,
            registry,
        }
    }

    /// Emitter for `namespace` on the process-wide registry.
    pub fn global(namespace: &str) -> Result<Self, DeprecateError> {
        Registry::global().emitter(namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn mode(&self) -> NamespaceMode {
        self.mode
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Whether calls are currently no-ops, either because the namespace is
    /// suppressed or because the registry is disabled.
    #[inline]
    pub fn is_suppressed(&self) -> bool {
        self.mode == NamespaceMode::Suppress || !self.registry.is_enabled()
    }

    #[inline]
    pub fn is_traced(&self) -> bool {
        self.mode == NamespaceMode::Trace
    }

    /// Raises `message` for the caller's call site.
    ///
    /// Returns `true` if a notice was written, `false` if it was suppressed or
    /// already emitted for this site.
    #[track_caller]
    pub fn deprecate(&self, message: impl Into<SharedStr>) -> bool {
        self.deprecate_at(Location::caller(), message)
    }

    /// Raises `message` for an explicit caller location.
    ///
    /// If `caller` lies in the body of a running `#[deprecate]` function, the
    /// notice is attributed to that function's consumer instead.
    pub fn deprecate_at(
        &self,
        caller: &'static Location<'static>,
        message: impl Into<SharedStr>,
    ) -> bool {
        if self.is_suppressed() {
            #[cfg(feature = "stats")]
            self.stats.record_suppressed();
            return false;
        }

        let site = self.registry.resolve_site(effective_caller(caller));
        let key = NoticeKey::new(Arc::clone(&self.namespace), site, message);
        let traced = self.is_traced();

        if !self.registry.message_cache().should_emit(&key, traced) {
            #[cfg(feature = "stats")]
            self.stats.record_repeated();
            return false;
        }

        let mut notice = DeprecationNotice::new(key.namespace, key.message, key.site);
        if traced {
            notice = notice.with_backtrace(Backtrace::force_capture().to_string());
        }
        self.registry.dispatch(&notice);

        #[cfg(feature = "stats")]
        self.stats.record_emitted();
        true
    }

    /// Wraps `f` so every call through [`DeprecatedFn::call`] raises `message`.
    ///
    /// ```
    /// use depwarn_core::{MemorySink, Registry};
    /// use std::sync::Arc;
    ///
    /// let sink = Arc::new(MemorySink::new());
    /// let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
    /// let deprecate = registry.emitter("math").unwrap();
    ///
    /// let add = deprecate.wrap_fn(|a: i32, b: i32| a + b, "add() is deprecated");
    /// assert_eq!(add.call((2, 3)), 5);
    /// assert_eq!(sink.count_message("add() is deprecated"), 1);
    /// ```
    pub fn wrap_fn<F>(&self, f: F, message: impl Into<SharedStr>) -> DeprecatedFn<F> {
        DeprecatedFn::new(f, message.into(), self.clone())
    }

    /// Moves `value` behind accessors that raise `message` on every read or write.
    pub fn property<T>(
        &self,
        name: impl Into<SharedStr>,
        value: T,
        message: impl Into<SharedStr>,
    ) -> DeprecatedProperty<T> {
        DeprecatedProperty::new(name.into(), value, message.into(), self.clone())
    }

    /// Marks the existing property `name` of `target` as deprecated.
    ///
    /// # Errors
    ///
    /// [`DeprecateError::MissingProperty`] if `target` has no such property.
    pub fn wrap_property<V>(
        &self,
        target: &mut PropertyMap<V>,
        name: &str,
        message: impl Into<SharedStr>,
    ) -> Result<(), DeprecateError> {
        target.deprecate_entry(name, message.into(), self.clone())
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("namespace", &self.namespace)
            .field("mode", &self.mode)
            .finish()
    }
}
