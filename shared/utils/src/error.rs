use orderdesk_models::AccessDenied;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::import::ImportError;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum OrderDeskError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Order import error: {message}")]
    Import { kind: String, message: String },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

impl OrderDeskError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Import { kind, .. } => kind,
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Database { .. } => 500,
            Self::Validation { .. } => 400,
            Self::Import { .. } => 422,
            Self::Authentication { .. } => 401,
            Self::Authorization { .. } => 403,
            Self::Configuration { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
        }
    }
}

pub type OrderDeskResult<T> = Result<T, OrderDeskError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<OrderDeskError> for ErrorResponse {
    fn from(error: OrderDeskError) -> Self {
        let details = match &error {
            OrderDeskError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl From<ImportError> for OrderDeskError {
    fn from(error: ImportError) -> Self {
        Self::Import {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<AccessDenied> for OrderDeskError {
    fn from(error: AccessDenied) -> Self {
        Self::Authorization {
            message: error.to_string(),
        }
    }
}

impl From<sqlx::Error> for OrderDeskError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string())
    }
}

impl From<config::ConfigError> for OrderDeskError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<serde_json::Error> for OrderDeskError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}
