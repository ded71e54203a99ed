use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::created_response;
use crate::errors::ApiError;
use crate::services::inventory::UpsertItemRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/supplier/:supplier_id", get(list_items))
        .route("/supplier/:supplier_id/add", post(add_item))
        .route("/supplier/:supplier_id/update/:item_id", put(update_item))
        .route("/supplier/:supplier_id/delete/:item_id", delete(delete_item))
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.services.inventory.list_items(supplier_id).await?;
    Ok(Json(items))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .inventory
        .add_item(supplier_id, payload)
        .await?;
    Ok(created_response(json!({
        "message": "Item added successfully!",
        "itemId": item.id,
    })))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((supplier_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpsertItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .inventory
        .update_item(supplier_id, item_id, payload)
        .await?;
    Ok(Json(json!({ "message": "Item updated successfully!" })))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path((supplier_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .inventory
        .delete_item(supplier_id, item_id)
        .await?;
    Ok(Json(json!({ "message": "Item deleted successfully!" })))
}
