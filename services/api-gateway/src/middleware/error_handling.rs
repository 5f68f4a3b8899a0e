use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orderdesk_database::StoreError;
use orderdesk_models::AccessDenied;
use orderdesk_utils::{ErrorResponse, OrderDeskError};

use crate::import::ImportFailure;

/// Handler error rendered as an `ErrorResponse` body.
#[derive(Debug)]
pub struct ApiError(pub OrderDeskError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

impl From<OrderDeskError> for ApiError {
    fn from(error: OrderDeskError) -> Self {
        Self(error)
    }
}

impl From<AccessDenied> for ApiError {
    fn from(error: AccessDenied) -> Self {
        Self(error.into())
    }
}

impl From<ImportFailure> for ApiError {
    fn from(failure: ImportFailure) -> Self {
        Self(failure.into())
    }
}

// Extractor rejections keep the usual error body instead of axum's plain text.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(OrderDeskError::validation("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(OrderDeskError::validation("path", rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(OrderDeskError::validation("body", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(OrderDeskError::validation("file", rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self(OrderDeskError::validation("file", error.body_text()))
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let error = match error {
            StoreError::Conflict { .. } => OrderDeskError::conflict(error.to_string()),
            StoreError::NotFound { id } => OrderDeskError::not_found(format!("order {}", id)),
            StoreError::InvalidRecord { message } => OrderDeskError::validation("order", message),
            StoreError::Backend { message } => OrderDeskError::database(message),
        };
        Self(error)
    }
}
