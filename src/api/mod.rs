//! HTTP API module for the Pointage Engine.
//!
//! This module provides the REST API endpoints for recording geofenced
//! check-ins and reading a user's attendance.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CheckInRequest, PositionErrorRequest, PositionRequest};
pub use response::{ApiError, ApiErrorResponse, HistoryResponse, TodayResponse};
pub use state::AppState;
