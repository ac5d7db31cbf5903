//! Route handlers.

pub mod menu;
pub mod orders;

use axum::http::StatusCode;
use brunos_core::OrderError;

/// Map an order error onto an HTTP status.
pub(crate) fn error_response(err: OrderError) -> (StatusCode, String) {
    let status = match err {
        OrderError::ValidationError(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
