use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde_json::json;

use super::common::{created_response, success_response, validate_input};
use crate::errors::ApiError;
use crate::services::auth::{LoginRequest, RegisterRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let user = state.services.auth.register(payload).await?;
    Ok(created_response(json!({
        "message": "Registration successful!",
        "user": user,
    })))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let user = state.services.auth.login(payload).await?;
    Ok(success_response(json!({
        "message": "Login successful!",
        "user": user,
    })))
}
