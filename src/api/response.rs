//! Response types for the savings engine API.
//!
//! This module defines the error response structures, the error mapping,
//! and the wire shape of rejected records.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{
    AuditTrace, FilterOutcome, FilteredRecord, RejectedRecord, RejectionReason, ValidatedRecord,
    ValidationOutcome, WindowSum,
};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::InvalidPeriodDate { period, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_PERIOD_DATE",
                    message,
                    format!("Period {} must use the YYYY-MM-DD hh:mm:ss format", period),
                ),
            },
            EngineError::InvalidHorizon { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_HORIZON", message),
            },
            EngineError::MixedNumericRepresentation { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "MIXED_NUMERIC_REPRESENTATION",
                    message,
                    "Every amount and rule value must be a whole number under the integral policy",
                ),
            },
            EngineError::CalculationError { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

/// A rejected record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecordResponse {
    /// The date text as supplied.
    pub date: Option<String>,
    /// The amount as supplied.
    pub amount: Decimal,
    /// The snake_case rejection reason.
    pub reason: RejectionReason,
    /// Human-readable explanation.
    pub message: String,
}

impl RejectedRecordResponse {
    /// Builds the wire form of `record`, quoting `max_amount` where relevant.
    pub fn new(record: RejectedRecord, max_amount: Decimal) -> Self {
        Self {
            message: record.reason.message(max_amount),
            date: record.date,
            amount: record.amount,
            reason: record.reason,
        }
    }
}

fn rejected_records(
    records: Vec<RejectedRecord>,
    max_amount: Decimal,
) -> Vec<RejectedRecordResponse> {
    records
        .into_iter()
        .map(|record| RejectedRecordResponse::new(record, max_amount))
        .collect()
}

/// Response body of `/transactions/validator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorResponse {
    /// Accepted records with their residues.
    pub valid: Vec<ValidatedRecord>,
    /// Rejected records with reasons.
    pub invalid: Vec<RejectedRecordResponse>,
}

impl ValidatorResponse {
    /// Builds the response from a validation outcome.
    pub fn new(outcome: ValidationOutcome, max_amount: Decimal) -> Self {
        Self {
            valid: outcome.accepted,
            invalid: rejected_records(outcome.rejected, max_amount),
        }
    }
}

/// Response body of `/transactions/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    /// Kept records with resolved remanents and window membership.
    pub valid: Vec<FilteredRecord>,
    /// Rejected records with reasons.
    pub invalid: Vec<RejectedRecordResponse>,
    /// Per-window sums.
    pub windows: Vec<WindowSum>,
    /// Rule decisions taken while filtering.
    pub audit_trace: AuditTrace,
}

impl FilterResponse {
    /// Builds the response from a filter outcome.
    pub fn new(outcome: FilterOutcome, max_amount: Decimal) -> Self {
        Self {
            valid: outcome.valid,
            invalid: rejected_records(outcome.invalid, max_amount),
            windows: outcome.windows,
            audit_trace: outcome.audit_trace,
        }
    }
}
