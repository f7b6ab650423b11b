use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure to turn client-submitted bytes into a raster image.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid or unsupported image data")]
    InvalidImage(#[from] image::ImageError),
}

/// Failure to collapse a score vector into a single prediction.
///
/// Both variants mean the model and the label table disagree about the
/// number of categories, which is a deployment problem rather than bad
/// client input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReduceError {
    #[error("model returned an empty score vector")]
    EmptyVector,

    #[error("no label for class index {index} (label table has {labels} entries)")]
    LabelMismatch { index: usize, labels: usize },
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("model not found at path: {0}")]
    ModelNotFound(String),

    #[error("model has no declared inputs")]
    MissingInput,

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Client-facing outcome of the inference pipeline. Everything that is not
/// the caller's fault collapses into `Internal`; the detail is logged at the
/// point of failure and never crosses the wire.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    BadInput(String),

    #[error("internal error")]
    Internal,
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match self {
            PipelineError::BadInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        match self {
            // Same body for unknown email and wrong password.
            CredentialError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response(),
            CredentialError::DuplicateEmail => (
                StatusCode::CONFLICT,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            CredentialError::Database(_) | CredentialError::Hash(_) | CredentialError::Internal => {
                tracing::error!(error = %self, "credential store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
