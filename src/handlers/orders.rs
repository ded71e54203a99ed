use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::created_response;
use crate::errors::ApiError;
use crate::services::orders::{HistoryQuery, PlaceOrderRequest, StatusQuery};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/place", post(place_order))
        .route("/vendor/:vendor_id", get(vendor_orders))
        .route("/history/vendor/:vendor_id", get(vendor_history))
        .route("/vendor/:vendor_id/cancel/:order_id", put(cancel_order))
        .route("/supplier/:supplier_id/incoming", get(incoming_orders))
        .route("/supplier/:supplier_id/accept/:order_id", put(accept_order))
        .route("/supplier/:supplier_id/reject/:order_id", put(reject_order))
        .route(
            "/supplier/:supplier_id/deliver/:order_id",
            put(deliver_order),
        )
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = state.services.orders.place_order(payload).await?;
    Ok(created_response(json!({
        "message": "Order placed successfully!",
        "orderId": order_id,
    })))
}

async fn vendor_orders(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.services.orders.vendor_orders(vendor_id).await?;
    Ok(Json(orders))
}

async fn vendor_history(
    State(state): State<Arc<AppState>>,
    Path(vendor_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .vendor_history(vendor_id, query)
        .await?;
    Ok(Json(orders))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path((vendor_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .orders
        .cancel_order(vendor_id, order_id)
        .await?;
    Ok(Json(json!({ "message": "Order cancelled successfully!" })))
}

async fn incoming_orders(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .incoming_orders(supplier_id, query)
        .await?;
    Ok(Json(orders))
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    Path((supplier_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .orders
        .accept_order(supplier_id, order_id)
        .await?;
    Ok(Json(json!({ "message": "Order accepted successfully!" })))
}

async fn reject_order(
    State(state): State<Arc<AppState>>,
    Path((supplier_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .orders
        .reject_order(supplier_id, order_id)
        .await?;
    Ok(Json(json!({ "message": "Order rejected successfully!" })))
}

async fn deliver_order(
    State(state): State<Arc<AppState>>,
    Path((supplier_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .orders
        .deliver_order(supplier_id, order_id)
        .await?;
    Ok(Json(
        json!({ "message": "Order marked as delivered successfully!" }),
    ))
}
