//! # Emitter Registry
//!
//! The long-lived store behind every [`Emitter`]: message cache, call-site memo,
//! suppression configuration, output sink and listeners.
//!
//! A process-wide instance is available through [`Registry::global`], configured
//! from `NO_DEPRECATION`/`TRACE_DEPRECATION` on first use and writing to standard
//! error. Independent registries can be built with [`Registry::builder`], which
//! keeps tests isolated from each other and from the environment.
//!
//! # Examples
//!
//! ```
//! use depwarn_core::{MemorySink, NamespaceMode, Registry, SuppressionConfig};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let registry = Arc::new(
//!     Registry::builder()
//!         .config(SuppressionConfig::new().suppress("quiet-lib"))
//!         .sink(sink.clone())
//!         .build(),
//! );
//!
//! let loud = registry.emitter("loud-lib").unwrap();
//! let quiet = registry.emitter("quiet-lib").unwrap();
//! assert_eq!(quiet.mode(), NamespaceMode::Suppress);
//!
//! loud.deprecate("loud notice");
//! quiet.deprecate("quiet notice");
//!
//! assert_eq!(sink.len(), 1);
//! assert_eq!(registry.cached_notices(), 1);
//! ```

use crate::call_site::{CallerResolver, FrameResolver, SiteCache};
use crate::{
    CallSite, DeprecateError, DeprecationNotice, Emitter, MessageCache, NoticeKey, Sink,
    StderrSink, SuppressionConfig,
};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "stats")]
use crate::NoticeStats;
#[cfg(feature = "stats")]
use dashmap::DashMap;

/// Callback receiving notices instead of the sink.
pub type Listener = Arc<dyn Fn(&DeprecationNotice) + Send + Sync>;

static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| {
    let config = SuppressionConfig::from_env();
    debug!(?config, "initialising global deprecation registry");
    Arc::new(Registry::builder().config(config).build())
});

/// Process-wide (or test-local) state shared by a set of emitters.
pub struct Registry {
    config: RwLock<SuppressionConfig>,
    enabled: AtomicBool,
    cache: MessageCache,
    sites: SiteCache,
    resolver: Box<dyn FrameResolver>,
    sink: RwLock<Arc<dyn Sink>>,
    listeners: RwLock<Vec<Listener>>,
    #[cfg(feature = "stats")]
    stats: DashMap<Arc<str>, Arc<NoticeStats>>,
}

impl Registry {
    /// A registry with an empty configuration writing to standard error.
    ///
    /// Unlike [`Registry::global`] it does not read the environment.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Creates the emitter for `namespace`.
    ///
    /// The namespace mode (emit, suppress, trace) is fixed at this point from
    /// the current configuration.
    ///
    /// The namespace is kept verbatim: `"ns"` and `"ns "` are distinct keys in
    /// the message cache and the statistics. Only the suppression lists, which
    /// are parsed from free-form text, compare trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// [`DeprecateError::MissingNamespace`] if `namespace` is empty or blank.
    pub fn emitter(self: &Arc<Self>, namespace: &str) -> Result<Emitter, DeprecateError> {
        if namespace.trim().is_empty() {
            return Err(DeprecateError::MissingNamespace);
        }

        let mode = self.config.read().mode_for(namespace);
        debug!(namespace, ?mode, "created deprecation emitter");

        Ok(Emitter::new(Arc::clone(self), Arc::from(namespace), mode))
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SuppressionConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration. Emitters created earlier keep their mode.
    pub fn set_config(&self, config: SuppressionConfig) {
        *self.config.write() = config;
    }

    /// Silences every emitter of this registry, including existing ones.
    pub fn disable_all(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Undoes [`disable_all`](Self::disable_all).
    pub fn enable_all(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_sink(&self, sink: Arc<dyn Sink>) {
        *self.sink.write() = sink;
    }

    /// Registers a listener. While at least one listener exists, notices are
    /// delivered to the listeners and the sink is bypassed.
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&DeprecationNotice) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Number of (namespace, call site, message) triples already handled.
    pub fn cached_notices(&self) -> usize {
        self.cache.len()
    }

    /// Whether the given triple has already been emitted.
    pub fn has_emitted(&self, namespace: &str, site: &CallSite, message: &str) -> bool {
        let key = NoticeKey::new(Arc::from(namespace), site.clone(), message.to_string());
        self.cache.contains(&key)
    }

    /// Number of raw locations memoized by the call-site resolver.
    pub fn resolved_sites(&self) -> usize {
        self.sites.len()
    }

    /// Snapshot of the counters of `namespace`.
    #[cfg(feature = "stats")]
    pub fn stats(&self, namespace: &str) -> Option<NoticeStats> {
        self.stats.get(namespace).map(|stats| (**stats).clone())
    }

    /// Resets the counters of `namespace`, returning `false` if it has none.
    #[cfg(feature = "stats")]
    pub fn reset_stats(&self, namespace: &str) -> bool {
        match self.stats.get(namespace) {
            Some(stats) => {
                stats.reset();
                true
            }
            None => false,
        }
    }

    /// Namespaces that have an emitter in this registry.
    #[cfg(feature = "stats")]
    pub fn namespaces(&self) -> Vec<String> {
        self.stats.iter().map(|entry| entry.key().to_string()).collect()
    }

    #[cfg(feature = "stats")]
    pub(crate) fn stats_for(&self, namespace: &Arc<str>) -> Arc<NoticeStats> {
        Arc::clone(
            self.stats
                .entry(Arc::clone(namespace))
                .or_insert_with(|| Arc::new(NoticeStats::new()))
                .value(),
        )
    }

    pub(crate) fn resolve_site(&self, caller: &'static Location<'static>) -> CallSite {
        self.sites.resolve(self.resolver.as_ref(), caller)
    }

    pub(crate) fn message_cache(&self) -> &MessageCache {
        &self.cache
    }

    /// Hands `notice` to the listeners, or to the sink if there are none.
    ///
    /// Locks are released before any callback runs, so listeners and sinks may
    /// raise notices themselves.
    pub(crate) fn dispatch(&self, notice: &DeprecationNotice) {
        let listeners: Vec<Listener> = self.listeners.read().clone();
        if !listeners.is_empty() {
            for listener in &listeners {
                listener(notice);
            }
            return;
        }

        let sink = Arc::clone(&*self.sink.read());
        sink.write_notice(notice);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Registry`].
pub struct RegistryBuilder {
    config: SuppressionConfig,
    sink: Option<Arc<dyn Sink>>,
    resolver: Option<Box<dyn FrameResolver>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            config: SuppressionConfig::new(),
            sink: None,
            resolver: None,
        }
    }

    pub fn config(mut self, config: SuppressionConfig) -> Self {
        self.config = config;
        self
    }

    /// Reads the configuration from the environment.
    pub fn config_from_env(self) -> Self {
        self.config(SuppressionConfig::from_env())
    }

    /// Output sink; [`StderrSink`] when not set.
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Call-site resolver; [`CallerResolver`] when not set.
    pub fn resolver<R>(mut self, resolver: R) -> Self
    where
        R: FrameResolver + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            config: RwLock::new(self.config),
            enabled: AtomicBool::new(true),
            cache: MessageCache::new(),
            sites: SiteCache::new(),
            resolver: self.resolver.unwrap_or_else(|| Box::new(CallerResolver)),
            sink: RwLock::new(self.sink.unwrap_or_else(|| Arc::new(StderrSink::new()))),
            listeners: RwLock::new(Vec::new()),
            #[cfg(feature = "stats")]
            stats: DashMap::new(),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySink, NamespaceMode};
    use std::sync::Mutex;

    fn registry_with_sink() -> (Arc<Registry>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
        (registry, sink)
    }

    #[test]
    fn test_blank_namespace_rejected() {
        let registry = Arc::new(Registry::new());
        assert_eq!(
            registry.emitter("").err(),
            Some(DeprecateError::MissingNamespace)
        );
        assert_eq!(
            registry.emitter("   ").err(),
            Some(DeprecateError::MissingNamespace)
        );
    }

    #[test]
    fn test_namespace_kept_verbatim() {
        let (registry, sink) = registry_with_sink();
        let exact = registry.emitter("ns").unwrap();
        let padded = registry.emitter("ns ").unwrap();

        assert_eq!(padded.namespace(), "ns ");

        let caller = std::panic::Location::caller();
        assert!(exact.deprecate_at(caller, "same message"));
        assert!(padded.deprecate_at(caller, "same message"));

        assert_eq!(sink.len(), 2);
        assert_eq!(registry.cached_notices(), 2);
    }

    #[test]
    fn test_mode_fixed_at_creation() {
        let registry = Arc::new(Registry::new());
        let before = registry.emitter("lib").unwrap();

        registry.set_config(SuppressionConfig::new().suppress("lib"));
        let after = registry.emitter("lib").unwrap();

        assert_eq!(before.mode(), NamespaceMode::Emit);
        assert_eq!(after.mode(), NamespaceMode::Suppress);
    }

    #[test]
    fn test_disable_all_applies_to_existing_emitters() {
        let (registry, sink) = registry_with_sink();
        let emitter = registry.emitter("lib").unwrap();

        registry.disable_all();
        assert!(!emitter.deprecate("silenced"));
        assert!(sink.is_empty());
        assert_eq!(registry.cached_notices(), 0);

        registry.enable_all();
        assert!(emitter.deprecate("heard"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_listeners_replace_sink() {
        let (registry, sink) = registry_with_sink();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        registry.add_listener(move |notice| {
            received_clone
                .lock()
                .unwrap()
                .push(notice.message().to_string());
        });

        let emitter = registry.emitter("lib").unwrap();
        emitter.deprecate("to listener");

        assert!(sink.is_empty());
        assert_eq!(*received.lock().unwrap(), vec!["to listener".to_string()]);

        registry.clear_listeners();
        assert_eq!(registry.listener_count(), 0);
        emitter.deprecate("to sink");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_listener_may_raise_notices() {
        let (registry, sink) = registry_with_sink();
        let inner = registry.emitter("inner").unwrap();
        registry.add_listener(move |notice| {
            if notice.namespace() == "outer" {
                inner.deprecate("raised from listener");
            }
        });

        let outer = registry.emitter("outer").unwrap();
        outer.deprecate("outer notice");

        // listeners swallow both notices, the important part is not deadlocking
        assert!(sink.is_empty());
        assert_eq!(registry.cached_notices(), 2);
    }

    #[test]
    fn test_has_emitted() {
        let (registry, sink) = registry_with_sink();
        let emitter = registry.emitter("lib").unwrap();

        let line = line!() + 1;
        emitter.deprecate("tracked");

        let site = sink.notices()[0].site().clone();
        assert_eq!(site.file(), file!());
        assert_eq!(site.line(), line);
        assert!(registry.has_emitted("lib", &site, "tracked"));
        assert!(!registry.has_emitted("lib", &site, "untracked"));
    }

    #[cfg(feature = "stats")]
    #[test]
    fn test_namespace_stats() {
        let (registry, _sink) = registry_with_sink();
        let emitter = registry.emitter("counted").unwrap();

        for _ in 0..4 {
            emitter.deprecate("same");
        }

        let stats = registry.stats("counted").unwrap();
        assert_eq!(stats.emitted(), 1);
        assert_eq!(stats.repeated(), 3);
        assert_eq!(registry.namespaces(), vec!["counted".to_string()]);

        assert!(registry.reset_stats("counted"));
        assert_eq!(registry.stats("counted").unwrap().total(), 0);
        assert!(!registry.reset_stats("missing"));
    }
}
