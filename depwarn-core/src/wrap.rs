//! # Deprecated Wrappers
//!
//! Wrappers that raise a notice every time the wrapped item is used, then
//! behave exactly like the original:
//!
//! - [`DeprecatedFn`] for callables, invoked through [`DeprecatedFn::call`]
//!   with the arguments packed in a tuple
//! - [`DeprecatedProperty`] for a single value behind accessors
//! - [`PropertyMap`] for string-keyed records where individual entries can be
//!   deprecated after the fact
//!
//! Wrappers never alter what the original returns. A panic raised by a wrapped
//! callable propagates unchanged, after its notice has been raised.

use crate::{DeprecateError, Emitter, SharedStr};
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;

/// A callable invoked with its arguments packed in a tuple.
///
/// Implemented for every `Fn` taking up to six arguments, and for
/// [`DeprecatedFn`] itself so wrappers can be nested.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Ret, $($ty,)*> Callable<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            #[track_caller]
            fn invoke(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                (self)($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A a);
impl_callable!(A a, B b);
impl_callable!(A a, B b, C c);
impl_callable!(A a, B b, C c, D d);
impl_callable!(A a, B b, C c, D d, E e);
impl_callable!(A a, B b, C c, D d, E e, G g);

/// A callable that raises a deprecation notice on each call.
///
/// # Examples
///
/// ```
/// use depwarn_core::{MemorySink, Registry};
/// use std::sync::Arc;
///
/// fn test_fn1() -> i32 { 1 }
///
/// let sink = Arc::new(MemorySink::new());
/// let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
/// let deprecate = registry.emitter("test-cache").unwrap();
///
/// let wrapped = deprecate.wrap_fn(test_fn1, "testFn1 is deprecated");
/// for _ in 0..5 {
///     assert_eq!(wrapped.call(()), 1);
/// }
/// assert_eq!(sink.len(), 1);
/// ```
pub struct DeprecatedFn<F> {
    inner: F,
    message: SharedStr,
    emitter: Emitter,
}

impl<F> DeprecatedFn<F> {
    pub(crate) fn new(inner: F, message: SharedStr, emitter: Emitter) -> Self {
        Self {
            inner,
            message,
            emitter,
        }
    }

    /// Raises the notice for the caller's site, then returns `f(args...)`.
    ///
    /// When `F` is itself a [`DeprecatedFn`], its notice is raised for the same
    /// caller. Deprecated items used inside an ordinary `F` report their own
    /// call sites.
    #[track_caller]
    pub fn call<Args>(&self, args: Args) -> <F as Callable<Args>>::Output
    where
        F: Callable<Args>,
    {
        self.emitter
            .deprecate_at(Location::caller(), self.message.clone());
        self.inner.invoke(args)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// The original callable. Calling it directly raises nothing.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F, Args> Callable<Args> for DeprecatedFn<F>
where
    F: Callable<Args>,
{
    type Output = F::Output;

    #[inline]
    #[track_caller]
    fn invoke(&self, args: Args) -> Self::Output {
        self.call(args)
    }
}

impl<F> fmt::Debug for DeprecatedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeprecatedFn")
            .field("namespace", &self.emitter.namespace())
            .field("message", &self.message)
            .finish()
    }
}

/// A value whose reads and writes raise a deprecation notice.
///
/// The wrapper owns the storage; accessors hand out references to it.
///
/// # Examples
///
/// ```
/// use depwarn_core::{MemorySink, Registry};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
/// let deprecate = registry.emitter("config").unwrap();
///
/// let mut timeout = deprecate.property("timeout", 30u64, "timeout is deprecated, use deadline");
/// assert_eq!(*timeout.get(), 30);
/// timeout.set(45);
/// assert_eq!(timeout.into_inner(), 45);
///
/// // read and write happen on different lines: two sites
/// assert_eq!(sink.len(), 2);
/// ```
pub struct DeprecatedProperty<T> {
    name: SharedStr,
    value: T,
    message: SharedStr,
    emitter: Emitter,
}

impl<T> DeprecatedProperty<T> {
    pub(crate) fn new(name: SharedStr, value: T, message: SharedStr, emitter: Emitter) -> Self {
        Self {
            name,
            value,
            message,
            emitter,
        }
    }

    #[track_caller]
    pub fn get(&self) -> &T {
        self.raise(Location::caller());
        &self.value
    }

    #[track_caller]
    pub fn get_mut(&mut self) -> &mut T {
        self.raise(Location::caller());
        &mut self.value
    }

    /// Replaces the value, returning the previous one.
    #[track_caller]
    pub fn set(&mut self, value: T) -> T {
        self.raise(Location::caller());
        std::mem::replace(&mut self.value, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Takes the value out without raising a notice.
    pub fn into_inner(self) -> T {
        self.value
    }

    fn raise(&self, caller: &'static Location<'static>) {
        self.emitter.deprecate_at(caller, self.message.clone());
    }
}

impl<T: fmt::Debug> fmt::Debug for DeprecatedProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // formatting is not a use of the property, no notice
        f.debug_struct("DeprecatedProperty")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

struct PropertySlot<V> {
    value: V,
    deprecation: Option<(SharedStr, Emitter)>,
}

impl<V> PropertySlot<V> {
    fn raise(&self, caller: &'static Location<'static>) {
        if let Some((message, emitter)) = &self.deprecation {
            emitter.deprecate_at(caller, message.clone());
        }
    }
}

/// A string-keyed record whose entries can be deprecated individually.
///
/// Deprecated entries raise their notice on [`get`](Self::get),
/// [`get_mut`](Self::get_mut) and [`set`](Self::set); other entries behave like
/// a plain map.
///
/// # Examples
///
/// ```
/// use depwarn_core::{MemorySink, PropertyMap, Registry};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
/// let deprecate = registry.emitter("test-cache").unwrap();
///
/// let mut obj = PropertyMap::new();
/// obj.insert("prop1", "value1");
/// obj.insert("prop2", "value2");
/// deprecate.wrap_property(&mut obj, "prop1", "prop1 is deprecated").unwrap();
///
/// for _ in 0..5 {
///     assert_eq!(obj.get("prop1"), Some(&"value1"));
///     assert_eq!(obj.get("prop2"), Some(&"value2"));
/// }
/// assert_eq!(sink.len(), 1);
///
/// assert!(deprecate.wrap_property(&mut obj, "prop9", "missing").is_err());
/// ```
pub struct PropertyMap<V> {
    entries: HashMap<String, PropertySlot<V>>,
}

impl<V> PropertyMap<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Defines `name` as a plain property, replacing any previous definition
    /// (and its deprecation). Returns the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.entries
            .insert(
                name.into(),
                PropertySlot {
                    value,
                    deprecation: None,
                },
            )
            .map(|slot| slot.value)
    }

    #[track_caller]
    pub fn get(&self, name: &str) -> Option<&V> {
        let slot = self.entries.get(name)?;
        slot.raise(Location::caller());
        Some(&slot.value)
    }

    #[track_caller]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let slot = self.entries.get_mut(name)?;
        slot.raise(Location::caller());
        Some(&mut slot.value)
    }

    /// Assigns `value` to `name`, keeping its deprecation if any.
    ///
    /// Assigning to a deprecated property raises its notice. Assigning to an
    /// unknown name defines a plain property. Returns the previous value.
    #[track_caller]
    pub fn set(&mut self, name: &str, value: V) -> Option<V> {
        match self.entries.get_mut(name) {
            Some(slot) => {
                slot.raise(Location::caller());
                Some(std::mem::replace(&mut slot.value, value))
            }
            None => self.insert(name, value),
        }
    }

    /// Removes `name` without raising a notice.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries.remove(name).map(|slot| slot.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_deprecated(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .map_or(false, |slot| slot.deprecation.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn deprecate_entry(
        &mut self,
        name: &str,
        message: SharedStr,
        emitter: Emitter,
    ) -> Result<(), DeprecateError> {
        let slot = self
            .entries
            .get_mut(name)
            .ok_or_else(|| DeprecateError::MissingProperty {
                property: name.to_string(),
            })?;
        slot.deprecation = Some((message, emitter));
        Ok(())
    }
}

impl<V> Default for PropertyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for PropertyMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, slot)| (name, &slot.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySink, Registry, SuppressionConfig};
    use std::sync::Arc;

    fn setup() -> (Emitter, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let registry = Arc::new(Registry::builder().sink(sink.clone()).build());
        (registry.emitter("test-cache").unwrap(), sink)
    }

    fn test_fn1() -> i32 {
        1
    }
    fn test_fn2() -> i32 {
        2
    }
    fn test_fn3() -> i32 {
        3
    }

    #[test]
    fn test_repeated_function_calls() {
        let (deprecate, sink) = setup();
        let wrapped_fn1 = deprecate.wrap_fn(test_fn1, "testFn1 is deprecated");

        for _ in 0..5 {
            assert_eq!(wrapped_fn1.call(()), 1);
        }

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.count_message("testFn1 is deprecated"), 1);
    }

    #[test]
    fn test_varied_function_calls() {
        let (deprecate, sink) = setup();
        let wrapped_fn1 = deprecate.wrap_fn(test_fn1, "testFn1 is deprecated");
        let wrapped_fn2 = deprecate.wrap_fn(test_fn2, "testFn2 is deprecated");
        let wrapped_fn3 = deprecate.wrap_fn(test_fn3, "testFn3 is deprecated");

        let call = |n: usize| match n {
            1 => wrapped_fn1.call(()),
            2 => wrapped_fn2.call(()),
            _ => wrapped_fn3.call(()),
        };
        let results: Vec<i32> = [1, 2, 3, 1, 2].iter().map(|&n| call(n)).collect();

        assert_eq!(results, vec![1, 2, 3, 1, 2]);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_arguments_and_result_pass_through() {
        let (deprecate, _sink) = setup();
        let concat = deprecate.wrap_fn(
            |a: &str, b: String, n: usize| format!("{}{}", a, b).repeat(n),
            "concat is deprecated",
        );
        assert_eq!(concat.call(("ab", "c".to_string(), 2)), "abcabc");

        let divide = deprecate.wrap_fn(
            |a: i32, b: i32| {
                if b == 0 {
                    Err("Division by zero".to_string())
                } else {
                    Ok(a / b)
                }
            },
            "divide is deprecated",
        );
        assert_eq!(divide.call((10, 2)), Ok(5));
        assert_eq!(divide.call((1, 0)), Err("Division by zero".to_string()));
    }

    #[test]
    fn test_panic_propagates_after_notice() {
        let (deprecate, sink) = setup();
        let exploding = deprecate.wrap_fn(|| -> i32 { panic!("original failure") }, "boom");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| exploding.call(())));

        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"original failure"));
        assert_eq!(sink.count_message("boom"), 1);
    }

    #[test]
    fn test_nested_wrappers_report_outermost_site() {
        let (deprecate, sink) = setup();
        let inner = deprecate.wrap_fn(|x: i32| x + 1, "inner is deprecated");
        let outer = deprecate.wrap_fn(inner, "outer is deprecated");

        let line = line!() + 1;
        assert_eq!(outer.call((1,)), 2);

        let notices = sink.notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.site().line() == line));
        assert!(notices.iter().all(|n| n.site().file() == file!()));
    }

    #[test]
    fn test_callback_calls_keep_their_own_sites() {
        let (deprecate, sink) = setup();
        let old = deprecate.wrap_fn(test_fn1, "old is deprecated");
        let run = deprecate.wrap_fn(|cb: &dyn Fn()| cb(), "run is deprecated");

        let first = line!() + 3;
        let second = line!() + 3;
        let callback: &dyn Fn() = &|| {
            old.call(());
            old.call(());
        };
        run.call((callback,));
        old.call(());
        old.call(());

        assert_eq!(sink.count_message("run is deprecated"), 1);
        assert_eq!(sink.count_message("old is deprecated"), 4);

        let callback_lines: Vec<u32> = sink
            .notices()
            .iter()
            .filter(|n| n.message() == "old is deprecated")
            .map(|n| n.site().line())
            .take(2)
            .collect();
        assert_eq!(callback_lines, vec![first, second]);
    }

    #[test]
    fn test_suppressed_wrapper_still_delegates() {
        let sink = Arc::new(MemorySink::new());
        let registry = Arc::new(
            Registry::builder()
                .config(SuppressionConfig::new().suppress("test-cache"))
                .sink(sink.clone())
                .build(),
        );
        let deprecate = registry.emitter("test-cache").unwrap();
        let wrapped = deprecate.wrap_fn(test_fn2, "testFn2 is deprecated");

        for _ in 0..5 {
            assert_eq!(wrapped.call(()), 2);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_inner_is_silent() {
        let (deprecate, sink) = setup();
        let wrapped = deprecate.wrap_fn(test_fn3, "testFn3 is deprecated");

        assert_eq!((wrapped.inner())(), 3);
        assert_eq!(wrapped.message(), "testFn3 is deprecated");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_property_reads() {
        let (deprecate, sink) = setup();
        let prop1 = deprecate.property("prop1", "value1", "prop1 is deprecated");

        for _ in 0..5 {
            assert_eq!(*prop1.get(), "value1");
        }
        assert_eq!(sink.len(), 1);
        assert_eq!(prop1.name(), "prop1");
    }

    #[test]
    fn test_property_get_mut_and_set() {
        let (deprecate, sink) = setup();
        let mut counter = deprecate.property("counter", 1, "counter is deprecated");

        *counter.get_mut() += 1;
        let previous = counter.set(10);

        assert_eq!(previous, 2);
        assert_eq!(counter.into_inner(), 10);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_property_map_varied_access() {
        let (deprecate, sink) = setup();
        let mut obj = PropertyMap::new();
        obj.insert("prop1", "value1");
        obj.insert("prop2", "value2");
        obj.insert("prop3", "value3");
        for name in ["prop1", "prop2", "prop3"] {
            deprecate
                .wrap_property(&mut obj, name, format!("{} is deprecated", name))
                .unwrap();
        }

        for name in ["prop1", "prop2", "prop3", "prop1", "prop2"] {
            assert!(obj.get(name).is_some());
        }

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count_message("prop1 is deprecated"), 1);
    }

    #[test]
    fn test_property_map_missing_property() {
        let (deprecate, _sink) = setup();
        let mut obj: PropertyMap<i32> = PropertyMap::new();

        let err = deprecate
            .wrap_property(&mut obj, "ghost", "ghost is deprecated")
            .unwrap_err();

        assert_eq!(
            err,
            DeprecateError::MissingProperty {
                property: "ghost".to_string()
            }
        );
        assert!(!obj.contains("ghost"));
    }

    #[test]
    fn test_property_map_set_keeps_deprecation() {
        let (deprecate, sink) = setup();
        let mut obj = PropertyMap::new();
        obj.insert("level", 1);
        deprecate
            .wrap_property(&mut obj, "level", "level is deprecated")
            .unwrap();

        assert_eq!(obj.set("level", 2), Some(1));
        assert!(obj.is_deprecated("level"));
        assert_eq!(obj.set("fresh", 5), None);
        assert!(!obj.is_deprecated("fresh"));
        assert_eq!(sink.len(), 1);

        // redefining clears the deprecation
        obj.insert("level", 3);
        assert!(!obj.is_deprecated("level"));
        assert_eq!(obj.remove("level"), Some(3));
        assert_eq!(obj.len(), 1);
    }
}
