use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::probes::ProbeError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Probe(ProbeError::UnknownProbe(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            _ => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "status": "error",
            "code": status.as_u16(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
