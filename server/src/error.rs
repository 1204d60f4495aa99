use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use roster::{communities::UnknownCommunity, store::StoreError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid address, expected 0x-prefixed 40 hex characters")]
    InvalidAddress,

    #[error("Unknown community: {0}")]
    UnknownCommunity(String),

    #[error("Address is not eligible for any community")]
    NotEligible,

    #[error("Address already registered for clawback")]
    AlreadyRegistered,

    #[error("Invalid price payload")]
    InvalidPrice,

    #[error("No price recorded")]
    NoPriceData,

    #[error("Unknown route")]
    UnknownRoute,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid or missing api key")]
    InvalidApiKey,

    #[error("Upstream unreachable")]
    Upstream(#[source] reqwest::Error),

    #[error("Internal error")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyRegistered => AppError::AlreadyRegistered,
            other => AppError::Internal(other),
        }
    }
}

impl From<UnknownCommunity> for AppError {
    fn from(err: UnknownCommunity) -> Self {
        AppError::UnknownCommunity(err.0)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload
            | AppError::MissingField(_)
            | AppError::InvalidAddress
            | AppError::UnknownCommunity(_)
            | AppError::NotEligible
            | AppError::InvalidPrice => StatusCode::BAD_REQUEST,

            AppError::AlreadyRegistered => StatusCode::CONFLICT,

            AppError::NoPriceData | AppError::UnknownRoute => StatusCode::NOT_FOUND,

            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,

            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Callers only ever see the short message; the source goes to the log.
        if status.is_server_error() {
            error!("Request failed: {self:?}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::AppError;
    use roster::store::StoreError;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_bad_request_family() {
        assert_eq!(status_of(AppError::MalformedPayload), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::MissingField("address")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::InvalidAddress), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::UnknownCommunity("doge".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::NotEligible), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidPrice), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict() {
        assert_eq!(status_of(AppError::AlreadyRegistered), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_and_method() {
        assert_eq!(status_of(AppError::NoPriceData), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::UnknownRoute), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_unauthorized() {
        assert_eq!(status_of(AppError::InvalidApiKey), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        assert!(matches!(
            AppError::from(StoreError::AlreadyRegistered),
            AppError::AlreadyRegistered
        ));
    }

    #[test]
    fn test_store_contention_is_internal() {
        let err = AppError::from(StoreError::Contention);

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
