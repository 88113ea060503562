//! # Suppression Policy
//!
//! Decides, per namespace, whether notices are emitted once per call site,
//! suppressed entirely, or traced on every occurrence.
//!
//! The policy is read from two environment variables:
//!
//! - `NO_DEPRECATION`: namespaces whose notices are suppressed
//! - `TRACE_DEPRECATION`: namespaces whose notices are reported on every
//!   occurrence, with a backtrace
//!
//! Both hold names separated by commas and/or whitespace. Names are matched
//! case-insensitively and `*` matches every namespace. Suppression always takes
//! precedence over tracing.
//!
//! ```
//! use depwarn_core::{NamespaceMode, SuppressionConfig};
//!
//! let config = SuppressionConfig::from_lists(Some("test-cache, legacy"), Some("*"));
//!
//! assert_eq!(config.mode_for("test-cache"), NamespaceMode::Suppress);
//! assert_eq!(config.mode_for("LEGACY"), NamespaceMode::Suppress);
//! assert_eq!(config.mode_for("other"), NamespaceMode::Trace);
//! ```

use std::env;

/// Environment variable listing suppressed namespaces.
pub const NO_DEPRECATION_VAR: &str = "NO_DEPRECATION";

/// Environment variable listing traced namespaces.
pub const TRACE_DEPRECATION_VAR: &str = "TRACE_DEPRECATION";

const WILDCARD: &str = "*";

/// How an emitter treats the notices of its namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamespaceMode {
    /// Emit once per (call site, message)
    Emit,
    /// Never emit, skip all bookkeeping
    Suppress,
    /// Emit every occurrence, bypassing the message cache
    Trace,
}

/// Namespace allow/deny configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuppressionConfig {
    no_deprecation: Vec<String>,
    trace_deprecation: Vec<String>,
    disable_all: bool,
    trace_all: bool,
}

impl SuppressionConfig {
    /// An empty configuration: every namespace emits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `NO_DEPRECATION` and `TRACE_DEPRECATION` from the process environment.
    ///
    /// Unset or non-unicode variables count as empty lists.
    pub fn from_env() -> Self {
        let no_deprecation = env::var(NO_DEPRECATION_VAR).ok();
        let trace_deprecation = env::var(TRACE_DEPRECATION_VAR).ok();
        Self::from_lists(no_deprecation.as_deref(), trace_deprecation.as_deref())
    }

    /// Builds a configuration from raw list values in environment syntax.
    pub fn from_lists(no_deprecation: Option<&str>, trace_deprecation: Option<&str>) -> Self {
        Self {
            no_deprecation: no_deprecation.map(parse_namespace_list).unwrap_or_default(),
            trace_deprecation: trace_deprecation
                .map(parse_namespace_list)
                .unwrap_or_default(),
            disable_all: false,
            trace_all: false,
        }
    }

    /// Adds a namespace (or `*`) to the suppression list.
    pub fn suppress(mut self, namespace: impl AsRef<str>) -> Self {
        self.no_deprecation
            .push(namespace.as_ref().trim().to_lowercase());
        self
    }

    /// Adds a namespace (or `*`) to the trace list.
    pub fn trace(mut self, namespace: impl AsRef<str>) -> Self {
        self.trace_deprecation
            .push(namespace.as_ref().trim().to_lowercase());
        self
    }

    /// Suppresses every namespace.
    pub fn disable_all(mut self, disable: bool) -> Self {
        self.disable_all = disable;
        self
    }

    /// Traces every namespace that is not suppressed.
    pub fn trace_all(mut self, trace: bool) -> Self {
        self.trace_all = trace;
        self
    }

    pub fn is_suppressed(&self, namespace: &str) -> bool {
        self.disable_all || list_contains(&self.no_deprecation, namespace)
    }

    pub fn is_traced(&self, namespace: &str) -> bool {
        self.trace_all || list_contains(&self.trace_deprecation, namespace)
    }

    /// Resolves the mode of `namespace`. Suppression wins over tracing.
    pub fn mode_for(&self, namespace: &str) -> NamespaceMode {
        if self.is_suppressed(namespace) {
            NamespaceMode::Suppress
        } else if self.is_traced(namespace) {
            NamespaceMode::Trace
        } else {
            NamespaceMode::Emit
        }
    }
}

/// Splits a namespace list on commas and whitespace, lowercasing each entry.
///
/// # Examples
///
/// ```
/// use depwarn_core::suppression::parse_namespace_list;
///
/// assert_eq!(parse_namespace_list(" a, B  c,,"), vec!["a", "b", "c"]);
/// assert!(parse_namespace_list("").is_empty());
/// ```
pub fn parse_namespace_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn list_contains(list: &[String], namespace: &str) -> bool {
    if list.is_empty() {
        return false;
    }
    let namespace = namespace.trim().to_lowercase();
    list.iter()
        .any(|entry| entry == WILDCARD || *entry == namespace)
}
