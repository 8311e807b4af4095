use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use yatra_domain::DomainError;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Domain(DomainError),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "AUTHENTICATION", msg),
            AppError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation(_) | DomainError::InvalidState(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Conflict(_) | DomainError::VehicleBusy => StatusCode::CONFLICT,
                    DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                    DomainError::Payment(_) => StatusCode::BAD_GATEWAY,
                    DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal Server Error: {err}");
                }
                (status, err.kind(), err.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
