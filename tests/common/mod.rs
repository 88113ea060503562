//! Deprecated items shared by integration tests, defined apart from the
//! consumer code that calls them

use depwarn::deprecate;

#[deprecate(namespace = "macro-tests", message = "run_legacy() is deprecated")]
pub fn run_legacy(callback: impl Fn()) {
    callback();
}
