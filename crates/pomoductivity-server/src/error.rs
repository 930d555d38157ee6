//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pomoductivity_core::{CoreError, ValidationError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("At least one duration field must be provided")]
    EmptySettingsUpdate,

    #[error("Invalid duration value. Duration must be a positive integer between 1 and 7200 seconds")]
    InvalidDuration,

    #[error("Session type is required")]
    MissingSessionType,

    #[error("Invalid session type. Must be one of: focus, short_break, long_break")]
    InvalidSessionType,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[source] CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(ValidationError::InvalidDuration { .. }) => ApiError::InvalidDuration,
            CoreError::Validation(ValidationError::InvalidSessionType(_)) => ApiError::InvalidSessionType,
            CoreError::Validation(ValidationError::EmptyUpdate) => ApiError::EmptySettingsUpdate,
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::EmptySettingsUpdate => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "validFields": ["focusDuration", "shortBreakDuration", "longBreakDuration"],
                }),
            ),
            ApiError::Internal(source) => {
                tracing::error!(error = %source, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": self.to_string() }))
            }
            _ => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_client_errors() {
        let err = ApiError::from(CoreError::from(ValidationError::InvalidSessionType("x".into())));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(CoreError::from(ValidationError::InvalidDuration {
            field: "focusDuration",
            value: "0".into(),
        }));
        assert!(matches!(err, ApiError::InvalidDuration));
    }

    #[test]
    fn empty_update_lists_valid_fields() {
        let err = ApiError::from(CoreError::from(ValidationError::EmptyUpdate));
        assert!(matches!(err, ApiError::EmptySettingsUpdate));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn driver_loss_is_a_server_error() {
        let err = ApiError::from(CoreError::DriverUnavailable);
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
