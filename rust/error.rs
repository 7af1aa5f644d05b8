use thiserror::Error;

/// Caller-side precondition violations.
///
/// Numerical edge cases (a near-singular stain matrix passed to
/// [`invert`](crate::invert), a row whose components cancel) are not errors:
/// they are resolved silently by sentinels and repairs. This enum only covers
/// inputs that are outside the contract of an operation.
#[derive(Debug, Error)]
pub enum StainError {
    /// Two arrays that must agree on a dimension do not.
    #[error("shape mismatch: {what} expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// The basis must hold 2 or 3 vectors.
    #[error("basis must contain 2 or 3 vectors, got {0}")]
    InvalidVectorCount(usize),
    /// Integer code that does not name a sort order.
    #[error("invalid sort order code {0} (expected 0, 1 or 2)")]
    InvalidSortOrder(i32),
    /// Integer code that does not name a vector direction.
    #[error("invalid vector direction code {0} (expected 0 or 1)")]
    InvalidDirection(i32),
    /// The sample matrix has no rows to test against.
    #[error("sample matrix has no rows")]
    NoSamples,
    /// A sub-sample of zero pixels was requested.
    #[error("number of testing pixels must be positive")]
    InvalidSampleCount,
    /// The stain matrix determinant is below the stability threshold.
    #[error("stain matrix is singular (|det| below OD min value)")]
    SingularStainMatrix,
    /// Reshaping through the host array library failed.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, StainError>;
