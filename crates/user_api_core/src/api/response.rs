//! Response envelope and error-to-status mapping.

use crate::repo::RepoError;
use http::StatusCode;
use log::error;
use serde::Serialize;
use serde_json::{json, Value};

/// Transport-neutral HTTP response produced by `UserHandler`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    /// `Allow` header value, set on 405 responses.
    pub allow: Option<&'static str>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            allow: None,
        }
    }

    /// Serializes `payload` as the body. Serialization of plain records
    /// cannot fail; a failure is reported as a 500.
    pub fn json(status: StatusCode, payload: &impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                error!("event=http_encode module=api status=error error={}", err);
                ApiError::Internal.into_response()
            }
        }
    }

    /// Encoded body bytes.
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }
}

/// Request failure as seen by HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(String),
    MalformedRequest(String),
    NotFound(String),
    RouteNotFound(String),
    MethodNotAllowed { allow: &'static str },
    Storage,
    Internal,
    Cancelled,
    DeadlineExceeded,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cancelled | Self::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::MalformedRequest(_) => "malformed_request",
            Self::NotFound(_) => "not_found",
            Self::RouteNotFound(_) => "route_not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Storage => "storage_error",
            Self::Internal => "internal_error",
            Self::Cancelled => "request_cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::MalformedRequest(message)
            | Self::NotFound(message) => message.clone(),
            Self::RouteNotFound(path) => format!("no route for path `{path}`"),
            Self::MethodNotAllowed { allow } => format!("method not allowed; expected {allow}"),
            Self::Storage => "internal storage error".to_string(),
            Self::Internal => "internal error".to_string(),
            Self::Cancelled => "request cancelled".to_string(),
            Self::DeadlineExceeded => "request deadline exceeded".to_string(),
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let allow = match &self {
            Self::MethodNotAllowed { allow } => Some(*allow),
            _ => None,
        };
        ApiResponse {
            status: self.status(),
            body: json!({
                "error": {
                    "code": self.code(),
                    "message": self.message(),
                }
            }),
            allow,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound(id) => Self::NotFound(format!("user not found: {id}")),
            RepoError::Cancelled => Self::Cancelled,
            RepoError::DeadlineExceeded => Self::DeadlineExceeded,
            other => {
                error!(
                    "event=repo_call module=api status=error error_code=storage_error error={}",
                    other
                );
                Self::Storage
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::db::DbError;
    use crate::repo::RepoError;
    use http::StatusCode;

    #[test]
    fn storage_errors_hide_details() {
        let err: ApiError =
            RepoError::Db(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)).into();
        let response = err.into_response();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body["error"]["code"], "storage_error");
        assert_eq!(response.body["error"]["message"], "internal storage error");
    }

    #[test]
    fn method_not_allowed_carries_allow_header() {
        let response = ApiError::MethodNotAllowed { allow: "GET, POST" }.into_response();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.allow, Some("GET, POST"));
    }

    #[test]
    fn context_failures_map_to_service_unavailable() {
        let cancelled: ApiError = RepoError::Cancelled.into();
        let expired: ApiError = RepoError::DeadlineExceeded.into();
        assert_eq!(cancelled.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(expired.code(), "deadline_exceeded");
    }
}
