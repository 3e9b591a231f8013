//! API error types with HTTP response mapping.
//!
//! Every failure leaves the service through [`classify`], which picks the
//! status code and builds the `{ "error": { kind, code, meta, message } }`
//! envelope.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use inventory_store::StoreError;
use serde::Serialize;
use serde_json::Value;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body or parameters could not be read.
    BadRequest(String),
    /// Domain or storage failure.
    Domain(DomainError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::InvalidArgument,
            ApiError::Domain(err) => err.kind(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => f.write_str(msg),
            ApiError::Domain(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub meta: Option<Value>,
    pub message: String,
}

/// HTTP status for each error kind.
///
/// Unclassified storage errors are treated as the client's fault.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ReferenceNotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument
        | ErrorKind::UniquenessViolation
        | ErrorKind::RequiredFieldViolation
        | ErrorKind::UnclassifiedStorageError => StatusCode::BAD_REQUEST,
        ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns an error into a status code and a client-safe body.
pub fn classify(err: &ApiError) -> (StatusCode, ErrorEnvelope) {
    let kind = err.kind();
    let (code, meta) = match err {
        ApiError::BadRequest(_) => (None, None),
        ApiError::Domain(domain) => (domain.code().map(String::from), domain.meta()),
    };
    let message = match kind {
        ErrorKind::UnknownError => "Internal server error".to_string(),
        _ => err.to_string(),
    };

    let envelope = ErrorEnvelope {
        error: ErrorBody {
            kind,
            code,
            meta,
            message,
        },
    };
    (status_for(kind), envelope)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = classify(&self);
        metrics::counter!("api_errors_total", "kind" => envelope.error.kind.as_str()).increment(1);

        if status.is_server_error() {
            tracing::error!(error = %self, kind = %envelope.error.kind, "request failed");
        } else {
            tracing::debug!(error = %self, kind = %envelope.error.kind, "request rejected");
        }

        (status, Json(envelope)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Domain(DomainError::Store(err))
    }
}
