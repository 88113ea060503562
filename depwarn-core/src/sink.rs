use crate::DeprecationNotice;
use chrono::Utc;
use parking_lot::Mutex;
use std::io::{self, IsTerminal, Write};

/// Destination of emitted deprecation notices.
///
/// Writing is fire-and-forget: a sink must not panic and has no way to report
/// failures, so a broken output stream never alters the behavior of the
/// deprecated code being called.
pub trait Sink: Send + Sync {
    fn write_notice(&self, notice: &DeprecationNotice);
}

/// Writes notices to standard error, one line each (the default sink).
///
/// Colors are used when standard error is a terminal.
#[derive(Clone, Copy, Debug)]
pub struct StderrSink {
    color: bool,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Always uses the plain, timestamped format.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Always uses the colored format.
    pub fn colored() -> Self {
        Self { color: true }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StderrSink {
    fn write_notice(&self, notice: &DeprecationNotice) {
        let line = if self.color {
            notice.format_colored()
        } else {
            notice.format_plain(Utc::now())
        };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
    }
}

/// Forwards notices to the `tracing` ecosystem as `WARN` events.
///
/// Useful when the application already routes diagnostics through a subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn write_notice(&self, notice: &DeprecationNotice) {
        tracing::warn!(
            target: "depwarn",
            namespace = notice.namespace(),
            site = %notice.site(),
            traced = notice.is_traced(),
            "{} deprecated {}",
            notice.namespace(),
            notice.message()
        );
    }
}

/// Keeps notices in memory.
///
/// Intended for tests that assert on what was emitted.
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
/// for _ in 0..3 {
///     deprecate.deprecate("old() is deprecated");
/// }
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.count_message("old() is deprecated"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    notices: Mutex<Vec<DeprecationNotice>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in emission order.
    pub fn notices(&self) -> Vec<DeprecationNotice> {
        self.notices.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }

    /// Number of notices carrying exactly `message`.
    pub fn count_message(&self, message: &str) -> usize {
        self.notices
            .lock()
            .iter()
            .filter(|notice| notice.message() == message)
            .count()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_notice(&self, notice: &DeprecationNotice) {
        self.notices.lock().push(notice.clone());
    }
}
