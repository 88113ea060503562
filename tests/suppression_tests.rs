//! Environment-driven suppression and tracing

use depwarn::{MemorySink, NamespaceMode, Registry, SuppressionConfig};
use serial_test::serial;
use std::env;
use std::sync::Arc;

fn registry_from_env(no: Option<&str>, trace: Option<&str>) -> (Arc<Registry>, Arc<MemorySink>) {
    match no {
        Some(value) => env::set_var("NO_DEPRECATION", value),
        None => env::remove_var("NO_DEPRECATION"),
    }
    match trace {
        Some(value) => env::set_var("TRACE_DEPRECATION", value),
        None => env::remove_var("TRACE_DEPRECATION"),
    }

    let sink = Arc::new(MemorySink::new());
    let registry = Arc::new(
        Registry::builder()
            .config_from_env()
            .sink(sink.clone())
            .build(),
    );

    env::remove_var("NO_DEPRECATION");
    env::remove_var("TRACE_DEPRECATION");
    (registry, sink)
}

#[test]
#[serial]
fn test_no_deprecation_list() {
    let (registry, sink) = registry_from_env(Some("test-cache,other"), None);

    let suppressed = registry.emitter("test-cache").unwrap();
    let active = registry.emitter("active").unwrap();

    for _ in 0..5 {
        suppressed.deprecate("hidden");
        active.deprecate("shown");
    }

    assert_eq!(suppressed.mode(), NamespaceMode::Suppress);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.count_message("shown"), 1);
}

#[test]
#[serial]
fn test_no_deprecation_wildcard() {
    let (registry, sink) = registry_from_env(Some("*"), Some("*"));

    let emitter = registry.emitter("anything").unwrap();
    let wrapped = emitter.wrap_fn(|| 5, "wrapped is deprecated");

    assert_eq!(wrapped.call(()), 5);
    assert!(sink.is_empty());
}

#[test]
#[serial]
fn test_trace_deprecation_reports_every_call_with_backtrace() {
    let (registry, sink) = registry_from_env(None, Some("Debug-Me"));

    let traced = registry.emitter("debug-me").unwrap();
    for _ in 0..3 {
        traced.deprecate("traced call");
    }

    let notices = sink.notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.backtrace().is_some()));
}

#[test]
#[serial]
fn test_config_snapshot_and_update() {
    let (registry, _sink) = registry_from_env(Some("a b"), None);

    assert_eq!(
        registry.config(),
        SuppressionConfig::from_lists(Some("a,b"), None)
    );

    registry.set_config(SuppressionConfig::new());
    assert_eq!(
        registry.emitter("a").unwrap().mode(),
        NamespaceMode::Emit
    );
}
