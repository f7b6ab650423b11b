use axum::{extract::State, Json};
use base64::{engine::general_purpose, Engine as _};
use metrics::counter;
use std::sync::Arc;
use tracing::info;

use crate::error::{CredentialError, PipelineError};
use crate::server::types::*;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, PipelineError> {
    counter!("predict_requests", 1);

    // The uri field arrives as "<scheme>,<base64 data>"; everything before
    // the first comma is discarded.
    let encoded = payload
        .uri
        .split_once(',')
        .map(|(_, rest)| rest)
        .ok_or_else(|| PipelineError::BadInput("missing base64 image segment".to_string()))?;

    let image_bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| PipelineError::BadInput(format!("base64 decode failed: {}", e)))?;

    let prediction = state.inference.infer(&image_bytes).await?;
    info!(
        file = %payload.file_name,
        label = %prediction.label,
        "prediction served"
    );

    Ok(Json(PredictResponse {
        prediction: prediction.label,
        probability: prediction.probability.to_string(),
    }))
}

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AccountResponse>, CredentialError> {
    let account = state
        .users
        .register(&payload.email, &payload.fullname, &payload.password)
        .await?;
    info!(email = %account.email, "user registered");

    Ok(Json(account.into()))
}

pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AccountResponse>, CredentialError> {
    let account = state.users.verify(&payload.email, &payload.password).await?;

    Ok(Json(account.into()))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ListedAccount>>, CredentialError> {
    let accounts = state.users.list().await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}
