//! Errors raised by the differentiation helpers.
//!
//! `AutodiffError` covers the few ways a derivative request can be malformed
//! or produce unusable numbers. Model and expansion layers convert it into
//! their own error types.

/// Result alias for differentiation helpers.
pub type AutodiffResult<T> = Result<T, AutodiffError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AutodiffError {
    /// A Jacobian was requested with respect to zero coordinates.
    EmptyInput,

    /// Two forward passes of the same map returned different output lengths.
    OutputDimChanged { expected: usize, found: usize },

    /// A derivative of the given order is NaN or infinite.
    NonFiniteDerivative { order: usize, value: f64 },

    /// The requested derivative order exceeds the nesting depth.
    OrderNotAvailable { order: usize, max: usize },
}

impl std::error::Error for AutodiffError {}

impl std::fmt::Display for AutodiffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutodiffError::EmptyInput => {
                write!(f, "Autodiff Error: cannot differentiate with respect to zero coordinates")
            }
            AutodiffError::OutputDimChanged { expected, found } => write!(
                f,
                "Autodiff Error: output length changed between passes \
                 (expected {expected}, found {found})"
            ),
            AutodiffError::NonFiniteDerivative { order, value } => {
                write!(f, "Autodiff Error: order-{order} derivative is not finite ({value})")
            }
            AutodiffError::OrderNotAvailable { order, max } => write!(
                f,
                "Autodiff Error: derivative order {order} not available (maximum is {max})"
            ),
        }
    }
}
