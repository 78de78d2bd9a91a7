//! Failure kinds shared by the transform estimators and evaluators.

use thiserror::Error;

/// Errors produced while fitting or evaluating a [`TransformModel`](crate::TransformModel).
///
/// Every variant except [`TransformError::UnknownModelKind`] and
/// [`TransformError::ParameterCount`] is recoverable at the call site by
/// supplying a different point set or skipping the current frame. The latter
/// two indicate a model decoded from a foreign representation and should be
/// surfaced, not retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("need at least {required} correspondence points, got {got}")]
    InsufficientPoints { required: usize, got: usize },
    #[error("correspondence points coincide in pixel space")]
    CoincidentPoints,
    #[error("correspondence points are collinear (normal equations are singular)")]
    CollinearPoints,
    #[error("transform is not invertible")]
    SingularTransform,
    #[error("unknown transform model kind `{0}`")]
    UnknownModelKind(String),
    #[error("transform model `{kind}` expects {expected} parameters, got {got}")]
    ParameterCount {
        kind: String,
        expected: usize,
        got: usize,
    },
    #[error("non-finite coordinate or coefficient")]
    NonFinite,
}

impl TransformError {
    /// Whether a caller can recover by changing its input (more points, a
    /// different frame). Decoding failures are contract violations.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            TransformError::UnknownModelKind(_) | TransformError::ParameterCount { .. }
        )
    }
}
