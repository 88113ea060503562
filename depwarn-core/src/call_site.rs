//! # Call-site Resolution
//!
//! Identifies the location in consumer code that triggered a deprecation notice.
//!
//! The compiler already knows where every call happens: functions marked
//! `#[track_caller]` receive the location of their caller through
//! [`Location::caller`]. Each `#[track_caller]` frame between the consumer and
//! the place where the location is read is transparently skipped, so the
//! public entry points of this crate (`Emitter::deprecate`, `DeprecatedFn::call`,
//! property accessors) all observe the consumer's call site.
//!
//! A [`FrameResolver`] turns that raw location into a [`CallSite`]. Results are
//! memoized per physical site in a [`SiteCache`], so an expensive resolver runs
//! at most once for every distinct location.
//!
//! Deprecated items defined with the attribute macro can call other deprecated
//! items from their own body. Those inner calls happen in library code, so the
//! body runs under an [`ActiveSiteGuard`]: notices raised from the file that
//! defines the deprecated item are attributed to the consumer frame that called
//! it. Notices raised anywhere else, such as in a consumer closure passed as an
//! argument, keep their own location.

use crate::SharedStr;
use dashmap::DashMap;
use std::cell::RefCell;
use std::fmt;
use std::panic::Location;

const UNKNOWN_FILE: &str = "<unknown>";

/// Source location (file, line, column) that invoked a deprecated item.
///
/// Two call sites are equal when all three components are equal, regardless of
/// how they were produced.
///
/// # Examples
///
/// ```
/// use depwarn_core::CallSite;
///
/// let site = CallSite::new("src/main.rs", 10, 5);
/// assert_eq!(site.to_string(), "src/main.rs:10:5");
/// assert!(!site.is_unknown());
///
/// assert!(CallSite::unknown().is_unknown());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: SharedStr,
    line: u32,
    column: u32,
}

impl CallSite {
    pub fn new(file: impl Into<SharedStr>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Sentinel used when no location information is available.
    ///
    /// All notices resolved to this site collapse into a single cache entry
    /// per namespace and message.
    pub const fn unknown() -> Self {
        Self {
            file: SharedStr::from_static(UNKNOWN_FILE),
            line: 0,
            column: 0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.column == 0 && self.file == UNKNOWN_FILE
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: SharedStr::from_static(location.file()),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Turns the compiler-provided caller location into a [`CallSite`].
///
/// Implementations must be deterministic: resolving the same location twice
/// has to yield equal call sites, otherwise message caching cannot work.
///
/// Any `Fn(&'static Location<'static>) -> CallSite` closure is a resolver:
///
/// ```
/// use depwarn_core::{CallSite, FrameResolver};
/// use std::panic::Location;
///
/// let basename = |loc: &'static Location<'static>| {
///     let file = loc.file().rsplit('/').next().unwrap_or(loc.file());
///     CallSite::new(file.to_string(), loc.line(), loc.column())
/// };
///
/// let site = basename.resolve(Location::caller());
/// assert!(site.line() > 0);
/// ```
pub trait FrameResolver: Send + Sync {
    fn resolve(&self, caller: &'static Location<'static>) -> CallSite;

    /// Whether results are worth memoizing in a [`SiteCache`].
    ///
    /// Resolvers that are a plain copy of the location can return `false` to
    /// skip the extra lookup.
    fn memoize(&self) -> bool {
        true
    }
}

/// Default resolver: the call site is the caller location itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallerResolver;

impl FrameResolver for CallerResolver {
    #[inline]
    fn resolve(&self, caller: &'static Location<'static>) -> CallSite {
        CallSite::from(caller)
    }

    fn memoize(&self) -> bool {
        false
    }
}

/// Resolver for environments where location data must not be exposed.
///
/// Every call resolves to [`CallSite::unknown`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableResolver;

impl FrameResolver for UnavailableResolver {
    fn resolve(&self, _caller: &'static Location<'static>) -> CallSite {
        CallSite::unknown()
    }

    fn memoize(&self) -> bool {
        false
    }
}

impl<F> FrameResolver for F
where
    F: Fn(&'static Location<'static>) -> CallSite + Send + Sync,
{
    fn resolve(&self, caller: &'static Location<'static>) -> CallSite {
        self(caller)
    }
}

/// Memo of resolved call sites, keyed by the raw location value.
///
/// Locations are compared by value (file, line, column) rather than by
/// address, since the compiler may emit several copies of the same location.
#[derive(Debug, Default)]
pub struct SiteCache {
    sites: DashMap<(&'static str, u32, u32), CallSite>,
}

impl SiteCache {
    pub fn new() -> Self {
        Self {
            sites: DashMap::new(),
        }
    }

    /// Resolves `caller`, running `resolver` only the first time a location is seen.
    pub fn resolve(
        &self,
        resolver: &dyn FrameResolver,
        caller: &'static Location<'static>,
    ) -> CallSite {
        if !resolver.memoize() {
            return resolver.resolve(caller);
        }

        let key = (caller.file(), caller.line(), caller.column());
        if let Some(site) = self.sites.get(&key) {
            return site.clone();
        }

        let site = resolver.resolve(caller);
        self.sites.entry(key).or_insert(site).clone()
    }

    /// Number of memoized locations.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

thread_local! {
    static ACTIVE_SITES: RefCell<Vec<ActiveSite>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy, Debug)]
struct ActiveSite {
    caller: &'static Location<'static>,
    origin: &'static str,
}

/// Marks the consumer location of a running deprecated item.
///
/// While the guard lives, notices raised from `origin` (the source file holding
/// the deprecated item) are attributed to the consumer location instead. Guards
/// nest: an inner deprecated item called from an outer one's body inherits the
/// outer consumer location. Dropping the guard restores the previous state,
/// including while unwinding from a panic.
///
/// # Examples
///
/// ```
/// use depwarn_core::ActiveSiteGuard;
/// use std::panic::Location;
///
/// let consumer = Location::caller();
/// {
///     let _guard = ActiveSiteGuard::enter(consumer, file!());
///     assert_eq!(ActiveSiteGuard::current(), Some(consumer));
/// }
/// assert_eq!(ActiveSiteGuard::current(), None);
/// ```
#[must_use = "the active site is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ActiveSiteGuard {
    _private: (),
}

impl ActiveSiteGuard {
    pub fn enter(caller: &'static Location<'static>, origin: &'static str) -> Self {
        let caller = effective_caller(caller);
        ACTIVE_SITES.with(|sites| sites.borrow_mut().push(ActiveSite { caller, origin }));
        Self { _private: () }
    }

    /// The innermost consumer location of the current thread, if a deprecated
    /// item is executing.
    pub fn current() -> Option<&'static Location<'static>> {
        ACTIVE_SITES.with(|sites| sites.borrow().last().map(|site| site.caller))
    }
}

impl Drop for ActiveSiteGuard {
    fn drop(&mut self) {
        ACTIVE_SITES.with(|sites| {
            sites.borrow_mut().pop();
        });
    }
}

/// The location a notice should be attributed to: the active consumer site if
/// `caller` lies in the running deprecated item's file, `caller` otherwise.
#[inline]
pub(crate) fn effective_caller(caller: &'static Location<'static>) -> &'static Location<'static> {
    ACTIVE_SITES.with(|sites| match sites.borrow().last() {
        Some(active) if active.origin == caller.file() => active.caller,
        _ => caller,
    })
}
