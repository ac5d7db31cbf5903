//! Order route handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use brunos_core::{NewOrder, Order};
use serde::Serialize;
use tracing::info;

use super::error_response;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

/// POST /api/order
pub async fn save_order(
    State(state): State<AppState>,
    Json(req): Json<NewOrder>,
) -> Result<Json<Order>, (StatusCode, String)> {
    let order = state.orders.save(req).await.map_err(error_response)?;
    Ok(Json(order))
}

/// DELETE /api/order
pub async fn delete_order(
    State(state): State<AppState>,
    Json(req): Json<NewOrder>,
) -> Result<Json<DeletedResponse>, (StatusCode, String)> {
    info!(article = %req.article, "Deleting order");
    let deleted = state.orders.delete(req).await.map_err(error_response)?;
    Ok(Json(DeletedResponse { deleted }))
}

/// GET /api/order
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, (StatusCode, String)> {
    let orders = state.orders.find_all().await.map_err(error_response)?;
    Ok(Json(orders))
}

/// GET /api/order/report
pub async fn get_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    info!("Generating orders report");
    let report = state.orders.generate_report().await.map_err(error_response)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], report))
}

/// DELETE /api/order/all
pub async fn clear_orders(
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, (StatusCode, String)> {
    let deleted = state.orders.delete_all().await.map_err(error_response)?;
    Ok(Json(DeletedResponse { deleted }))
}
