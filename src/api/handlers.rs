//! HTTP request handlers for the savings engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_returns, filter_expenses, parse_expenses, project_investment, validate_expenses,
};
use crate::error::EngineError;
use crate::models::{CallOptions, FilterInput, InvestmentVehicle, ReturnsInput, StandaloneInput};

use super::request::{
    FilterRequest, ParseRequest, ProjectionRequest, ReturnsRequest, ValidatorRequest,
};
use super::response::{ApiError, ApiErrorResponse, FilterResponse, ValidatorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/transactions/parse", post(parse_handler))
        .route("/transactions/validator", post(validator_handler))
        .route("/transactions/filter", post(filter_handler))
        .route("/returns/nps", post(nps_returns_handler))
        .route("/returns/index", post(index_returns_handler))
        .route("/projections/nps", post(nps_projection_handler))
        .route("/projections/index", post(index_projection_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn engine_error_response(err: EngineError, correlation_id: Uuid) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Calculation failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Handler for POST /transactions/parse.
async fn parse_handler(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing parse request");

    let expenses = match payload {
        Ok(Json(req)) => req.into_expenses(),
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let start_time = Instant::now();
    match parse_expenses(&expenses, state.config()) {
        Ok(transactions) => {
            info!(
                correlation_id = %correlation_id,
                records = transactions.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Parse completed"
            );
            json_response(StatusCode::OK, transactions)
        }
        Err(err) => engine_error_response(err, correlation_id),
    }
}

/// Handler for POST /transactions/validator.
async fn validator_handler(
    State(state): State<AppState>,
    payload: Result<Json<ValidatorRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing validator request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };
    let options = request
        .options
        .unwrap_or_default()
        .resolve(CallOptions::filter_defaults());

    let config = state.config();
    let start_time = Instant::now();
    match validate_expenses(&request.expenses, options.numeric, config) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                accepted = outcome.accepted.len(),
                rejected = outcome.rejected.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Validation completed"
            );
            json_response(
                StatusCode::OK,
                ValidatorResponse::new(outcome, config.limits().max_amount),
            )
        }
        Err(err) => engine_error_response(err, correlation_id),
    }
}

/// Handler for POST /transactions/filter.
async fn filter_handler(
    State(state): State<AppState>,
    payload: Result<Json<FilterRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing filter request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };
    let options = request
        .options
        .unwrap_or_default()
        .resolve(CallOptions::filter_defaults());
    let input: FilterInput = request.into();

    let config = state.config();
    let start_time = Instant::now();
    match filter_expenses(&input, &options, config) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                valid = outcome.valid.len(),
                invalid = outcome.invalid.len(),
                windows = outcome.windows.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Filter completed"
            );
            json_response(
                StatusCode::OK,
                FilterResponse::new(outcome, config.limits().max_amount),
            )
        }
        Err(err) => engine_error_response(err, correlation_id),
    }
}

/// Handler for POST /returns/nps.
async fn nps_returns_handler(
    state: State<AppState>,
    payload: Result<Json<ReturnsRequest>, JsonRejection>,
) -> Response {
    returns(InvestmentVehicle::Nps, state, payload)
}

/// Handler for POST /returns/index.
async fn index_returns_handler(
    state: State<AppState>,
    payload: Result<Json<ReturnsRequest>, JsonRejection>,
) -> Response {
    returns(InvestmentVehicle::Index, state, payload)
}

fn returns(
    vehicle: InvestmentVehicle,
    State(state): State<AppState>,
    payload: Result<Json<ReturnsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, %vehicle, "Processing returns request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };
    let options = request
        .options
        .unwrap_or_default()
        .resolve(CallOptions::returns_defaults());
    let input: ReturnsInput = request.into();

    let start_time = Instant::now();
    match calculate_returns(&input, vehicle, &options, state.config()) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                %vehicle,
                windows = outcome.windows.len(),
                total_ceiling = %outcome.total_ceiling,
                duration_us = start_time.elapsed().as_micros(),
                "Returns completed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => engine_error_response(err, correlation_id),
    }
}

/// Handler for POST /projections/nps.
async fn nps_projection_handler(
    state: State<AppState>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Response {
    projection(InvestmentVehicle::Nps, state, payload)
}

/// Handler for POST /projections/index.
async fn index_projection_handler(
    state: State<AppState>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Response {
    projection(InvestmentVehicle::Index, state, payload)
}

fn projection(
    vehicle: InvestmentVehicle,
    State(state): State<AppState>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, %vehicle, "Processing projection request");

    let input: StandaloneInput = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let start_time = Instant::now();
    match project_investment(&input, vehicle, state.config()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                %vehicle,
                returns = %result.returns,
                duration_us = start_time.elapsed().as_micros(),
                "Projection completed"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => engine_error_response(err, correlation_id),
    }
}
