//! Error type shared by every calculation stage

use crate::calculator::Stage;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DispersionError>;

/// Failures the dispersion calculator can report.
///
/// None of these are produced for valid inputs driven in the documented
/// stage order. The one recoverable numeric edge case (a zero outlet diameter
/// while deriving exit velocity) is handled inline and never surfaces here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispersionError {
    /// A caller-supplied value violates a precondition.
    #[error("invalid input '{field}': {reason}")]
    InvalidInput {
        /// Methodology symbol of the offending field (e.g. `H`, `V1`)
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A stage was invoked before the stages it depends on.
    #[error("stage {stage} requires {required} (current stage: {current})")]
    StageOrder {
        /// Stage that was invoked
        stage: Stage,
        /// Stage that must have completed first
        required: Stage,
        /// Most recently completed stage
        current: Stage,
    },

    /// A stage was invoked a second time.
    #[error("stage {0} has already been computed")]
    StageRepeated(Stage),

    /// A stage does not exist for this source class.
    #[error("stage {stage} is not applicable: {reason}")]
    StageNotApplicable {
        /// Stage that was invoked
        stage: Stage,
        /// Why it cannot run
        reason: &'static str,
    },

    /// No piecewise regime of a formula covers the value.
    #[error("{quantity} = {value} lies outside every regime of the methodology")]
    OutOfDomain {
        /// Quantity whose value selects the regime
        quantity: &'static str,
        /// Value that matched nothing
        value: f64,
    },

    /// An intermediate required by a formula has not been set.
    #[error("required value '{0}' has not been computed")]
    MissingValue(&'static str),
}

impl DispersionError {
    /// Shorthand for [`DispersionError::InvalidInput`].
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`DispersionError::OutOfDomain`].
    pub fn out_of_domain(quantity: &'static str, value: f64) -> Self {
        Self::OutOfDomain { quantity, value }
    }
}

/// Reject a formula result that is NaN or infinite.
///
/// # Errors
/// Returns [`DispersionError::OutOfDomain`] when `value` is not finite.
pub fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DispersionError::out_of_domain(quantity, value))
    }
}
