//! Error types for the round-up savings engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a whole call. Per-record validation
//! failures are not errors; they are reported as
//! [`RejectionReason`](crate::models::RejectionReason) values.

use thiserror::Error;

/// The main error type for the round-up savings engine.
///
/// Any of these errors fails the whole invocation: the engine never
/// returns partially aggregated results.
///
/// # Example
///
/// ```
/// use roundup_engine::error::EngineError;
///
/// let error = EngineError::InvalidHorizon {
///     age: 65,
///     retirement_age: 60,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid horizon: age 65 is past the retirement age of 60"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A boundary date of an override, addition or reporting period could
    /// not be parsed, even leniently.
    #[error("Invalid {field} date '{value}' in {period}")]
    InvalidPeriodDate {
        /// The period, e.g. `"q[2]"` or `"k[0]"`.
        period: String,
        /// Which boundary was malformed (`"start"` or `"end"`).
        field: String,
        /// The raw value supplied.
        value: String,
    },

    /// The projection horizon would be negative.
    #[error("Invalid horizon: age {age} is past the retirement age of {retirement_age}")]
    InvalidHorizon {
        /// The age supplied by the caller.
        age: u32,
        /// The configured retirement age.
        retirement_age: u32,
    },

    /// A fractional value was supplied to a call running under the integral
    /// numeric policy.
    #[error("Mixed numeric representation: {field} = {value} is not a whole number")]
    MixedNumericRepresentation {
        /// The field carrying the offending value, e.g. `"expenses[3].amount"`.
        field: String,
        /// The offending value.
        value: String,
    },

    /// A general calculation error occurred (overflow, division by zero).
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/tax.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/tax.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_period_date_displays_period_and_value() {
        let error = EngineError::InvalidPeriodDate {
            period: "q[1]".to_string(),
            field: "start".to_string(),
            value: "not-a-date".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid start date 'not-a-date' in q[1]");
    }

    #[test]
    fn test_mixed_numeric_representation_displays_field() {
        let error = EngineError::MixedNumericRepresentation {
            field: "expenses[0].amount".to_string(),
            value: "12.5".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Mixed numeric representation: expenses[0].amount = 12.5 is not a whole number"
        );
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "decimal overflow".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: decimal overflow");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_horizon_error() -> EngineResult<()> {
            Err(EngineError::InvalidHorizon {
                age: 61,
                retirement_age: 60,
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_horizon_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
