//! HTTP API module for the savings engine.
//!
//! A thin axum adapter over the call paths in [`crate::calculation`].

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    FilterRequest, OptionsRequest, ParseRequest, ProjectionRequest, ReturnsRequest,
    ValidatorRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, FilterResponse, RejectedRecordResponse, ValidatorResponse,
};
pub use state::AppState;
