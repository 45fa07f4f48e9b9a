use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use github_store::ContentsError;
use serde::Serialize;
use std::fmt;

use crate::domain::BackupError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ContentsError> for ApiError {
    fn from(err: ContentsError) -> Self {
        match err {
            ContentsError::Conflict => Self::conflict(err.to_string()),
            ContentsError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            ContentsError::Network(_) | ContentsError::ApiStatus { .. } => {
                tracing::error!("remote store error: {}", err);
                Self::bad_gateway(err.to_string())
            }
            ContentsError::Malformed(_) => {
                tracing::error!("remote store error: {}", err);
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<BackupError> for ApiError {
    fn from(err: BackupError) -> Self {
        match err {
            BackupError::NotFound => Self::not_found(err.to_string()),
            BackupError::Remote(remote) => remote.into(),
            BackupError::Malformed(_) => Self::internal(err.to_string()),
        }
    }
}
