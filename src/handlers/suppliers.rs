use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::suppliers::DiscoveryQuery;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier))
}

async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoveryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let suppliers = state.services.suppliers.list_suppliers(query).await?;
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let supplier = state.services.suppliers.get_supplier(id).await?;
    Ok(Json(supplier))
}
