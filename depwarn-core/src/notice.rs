use crate::{CallSite, SharedStr};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A deprecation notice ready to be written by a [`Sink`](crate::Sink).
///
/// Carries the structured parts (namespace, message, call site) so sinks can
/// choose their own layout; [`format_plain`](Self::format_plain) and
/// [`format_colored`](Self::format_colored) provide the stock line formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeprecationNotice {
    namespace: Arc<str>,
    message: SharedStr,
    site: CallSite,
    backtrace: Option<String>,
}

impl DeprecationNotice {
    pub fn new(namespace: Arc<str>, message: impl Into<SharedStr>, site: CallSite) -> Self {
        Self {
            namespace,
            message: message.into(),
            site,
            backtrace: None,
        }
    }

    /// Attaches a rendered backtrace (trace mode).
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }

    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    /// Whether the notice was raised in trace mode.
    pub fn is_traced(&self) -> bool {
        self.backtrace.is_some()
    }

    /// Plain line for non-terminal output.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use depwarn_core::{CallSite, DeprecationNotice};
    ///
    /// let notice = DeprecationNotice::new("my-lib".into(), "old() is deprecated", CallSite::new("src/app.rs", 4, 2));
    /// let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
    ///
    /// assert_eq!(
    ///     notice.format_plain(now),
    ///     "Mon, 19 Oct 2026 08:30:00 GMT my-lib deprecated old() is deprecated at src/app.rs:4:2"
    /// );
    /// ```
    pub fn format_plain(&self, now: DateTime<Utc>) -> String {
        let mut line = format!(
            "{} {} deprecated {} at {}",
            now.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.namespace,
            self.message,
            self.site
        );
        self.append_backtrace(&mut line);
        line
    }

    /// ANSI-colored line for terminal output.
    pub fn format_colored(&self) -> String {
        let mut line = format!(
            "\x1b[36;1m{}\x1b[22;39m \x1b[33;1mdeprecated\x1b[22;39m \x1b[0m{}\x1b[39m \x1b[36m{}\x1b[39m",
            self.namespace, self.message, self.site
        );
        self.append_backtrace(&mut line);
        line
    }

    fn append_backtrace(&self, line: &mut String) {
        if let Some(backtrace) = &self.backtrace {
            for frame in backtrace.lines() {
                line.push_str("\n    ");
                line.push_str(frame.trim_start());
            }
        }
    }
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deprecated {} at {}",
            self.namespace, self.message, self.site
        )
    }
}
