//! The `{success, result, message, error?}` envelope every AuroraHR route
//! answers with, and the error type that maps onto it.

use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Shared route result type.
pub type ApiResult<T> = Result<T, ApiError>;

pub const NOT_CONFIGURED_MESSAGE: &str = "AuroraHR user or company not configured";

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("AuroraHR user or company not configured")]
    NotConfigured,
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Upstream { message: String, detail: String },
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::NotConfigured => "NOT_CONFIGURED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upstream { .. } => "UPSTREAM_FAILURE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::NotConfigured => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn upstream(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            ApiError::Upstream { detail, .. } => {
                tracing::warn!(code = self.code(), %detail, "upstream failure");
                Some(detail.clone())
            }
            ApiError::Internal(err) => {
                tracing::error!(code = self.code(), error = ?err, "request failed");
                None
            }
            _ => None,
        };
        let body = Envelope::<()> {
            success: false,
            result: None,
            message: self.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}

/// Uniform JSON body for success and failure alike.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub result: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful envelope paired with its HTTP status.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    pub fn ok(result: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, result, message)
    }

    pub fn created(result: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, result, message)
    }

    fn with_status(status: StatusCode, result: T, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: Envelope {
                success: true,
                result: Some(result),
                message: message.into(),
                error: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Require a non-blank string field, returning it trimmed.
pub fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
