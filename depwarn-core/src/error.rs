use thiserror::Error;

/// Usage errors reported when a deprecation is declared.
///
/// Nothing in this crate fails once a deprecated item is being called; these
/// errors only surface synchronously from emitter creation and wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeprecateError {
    /// The namespace passed to `Registry::emitter` was empty or blank.
    #[error("a non-empty namespace is required to create an emitter")]
    MissingNamespace,

    /// `Emitter::wrap_property` was asked to wrap a property the target does not have.
    #[error("property '{property}' must exist on the target before it can be deprecated")]
    MissingProperty { property: String },
}
