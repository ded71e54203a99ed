use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::created_response;
use crate::errors::ApiError;
use crate::services::ratings::SubmitRatingRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(submit_rating))
        .route("/supplier/:supplier_id", get(supplier_summary))
}

async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.ratings.submit_rating(payload).await?;
    Ok(created_response(
        json!({ "message": "Rating submitted successfully!" }),
    ))
}

async fn supplier_summary(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.services.ratings.supplier_summary(supplier_id).await?;
    Ok(Json(summary))
}
