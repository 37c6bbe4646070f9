use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use types::errors::{BidError, LifecycleError, StoreError};

/// Central error type for the gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Transient fault; the client should retry
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "RATE_LIMIT_EXCEEDED")
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            AppError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg, "UNPROCESSABLE")
            }
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg, "SERVICE_UNAVAILABLE")
            }
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}

/// Validation failures map to 4xx, contention and infrastructure
/// faults to 503 so clients know a retry is safe.
impl From<BidError> for AppError {
    fn from(err: BidError) -> Self {
        match &err {
            BidError::AuctionNotFound { .. } => AppError::NotFound(err.to_string()),
            BidError::AuctionNotActive { .. } => AppError::Conflict(err.to_string()),
            BidError::SelfBidNotAllowed | BidError::BidTooLow { .. } => {
                AppError::Unprocessable(err.to_string())
            }
            BidError::Contention { .. } => AppError::ServiceUnavailable(err.to_string()),
            BidError::Store(store) => store_error(store),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match &err {
            LifecycleError::AuctionNotFound { .. } => AppError::NotFound(err.to_string()),
            LifecycleError::InvalidParameters { .. } => AppError::BadRequest(err.to_string()),
            LifecycleError::NotPermitted => AppError::Forbidden(err.to_string()),
            LifecycleError::InvalidTransition { .. } | LifecycleError::CancelWithBids { .. } => {
                AppError::Conflict(err.to_string())
            }
            LifecycleError::Contention { .. } => AppError::ServiceUnavailable(err.to_string()),
            LifecycleError::Store(store) => store_error(store),
        }
    }
}

fn store_error(err: &StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::NotFound(err.to_string()),
        StoreError::AlreadyExists | StoreError::VersionConflict => {
            AppError::Conflict(err.to_string())
        }
        StoreError::Unavailable { .. } => AppError::ServiceUnavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::AuctionId;
    use types::money::Price;

    #[test]
    fn test_bid_error_mapping() {
        let err: AppError = BidError::BidTooLow {
            amount: Price::from_u64(105),
            floor: Price::from_u64(110),
        }
        .into();
        assert!(matches!(err, AppError::Unprocessable(_)));

        let err: AppError = BidError::Contention {
            auction_id: AuctionId::new(),
            attempts: 8,
        }
        .into();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_lifecycle_error_mapping() {
        let err: AppError = LifecycleError::NotPermitted.into();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err: AppError = LifecycleError::CancelWithBids {
            auction_id: AuctionId::new(),
            bid_count: 3,
        }
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
