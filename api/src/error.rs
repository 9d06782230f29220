use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::booking::BookingError;
use crate::classifier::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("prediction {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Form(#[from] FormRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Booking(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Model(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Json(rejection) => rejection.status(),
            AppError::Form(rejection) => rejection.status(),
            AppError::Query(rejection) => rejection.status(),
            AppError::Path(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (
            status,
            Json(serde_json::json!({"error": self.to_string(), "success": false})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            AppError::from(BookingError::InvalidMonth(13)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(ModelError::NonFiniteMargin).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::NotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotFound(7).to_string(), "prediction 7 not found");
    }
}
