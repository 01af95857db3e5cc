use thiserror::Error;

/// Failure modes of path compilation. Both are raised before any
/// subscription exists; a failed build leaves nothing attached.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The expression contains a step that is not a property access.
    #[error("unsupported expression step: {0}; only property accesses, optionally behind a cast, can be observed")]
    UnsupportedExpression(String),

    /// An intermediate hop's value type cannot notify about its changes.
    #[error("intermediate property `{0}` is not observable")]
    UnsupportedLink(String),
}
