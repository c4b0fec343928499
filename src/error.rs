//! 统一的 API 错误类型与转换。

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::fmt;

use crate::converter::ConversionError;
use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    InvalidFormat {
        mime: String,
        expected: &'static str,
    },
    BadRequest(String),
    ConversionFailed(String),
    ConversionTimeout(u64),
    ArtifactMissing(String),
    TooManyRequests(u64),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFormat { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ConversionFailed(_)
            | ApiError::ConversionTimeout(_)
            | ApiError::ArtifactMissing(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidFormat { mime, expected } => write!(
                f,
                "Invalid file type ({mime}). Please upload a {expected} file."
            ),
            ApiError::BadRequest(msg) => f.write_str(msg),
            ApiError::ConversionFailed(msg) => write!(f, "Conversion failed: {msg}"),
            ApiError::ConversionTimeout(secs) => {
                write!(f, "Conversion timed out after {secs} seconds")
            }
            ApiError::ArtifactMissing(name) => {
                write!(f, "Conversion produced no output: {name} is missing")
            }
            ApiError::TooManyRequests(_) => f.write_str("Too many conversions in progress"),
            ApiError::Internal(msg) => write!(f, "Unexpected error: {msg}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut headers = HeaderMap::new();
        if let ApiError::TooManyRequests(retry_after) = &self
            && *retry_after > 0
            && let Ok(value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert(header::RETRY_AFTER, value);
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, headers, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::InvalidPath => ApiError::BadRequest("Invalid file name".into()),
            StorageError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ConversionError> for ApiError {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::Failed(_) | ConversionError::Export(_) => {
                ApiError::ConversionFailed(error.to_string())
            }
            ConversionError::Timeout(limit) => ApiError::ConversionTimeout(limit.as_secs()),
            ConversionError::ArtifactMissing(path) => ApiError::ArtifactMissing(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            ),
            ConversionError::Busy(retry_after) => ApiError::TooManyRequests(retry_after),
            ConversionError::Spawn(err) | ConversionError::Io(err) => {
                ApiError::Internal(err.to_string())
            }
            ConversionError::Join(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let invalid = ApiError::InvalidFormat {
            mime: "text/plain".into(),
            expected: "DOCX",
        };
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert!(invalid.to_string().contains("Invalid file type"));

        let failed: ApiError = ConversionError::Failed("exit status: 1".into()).into();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(failed, ApiError::ConversionFailed(_)));

        let missing: ApiError =
            ConversionError::ArtifactMissing(PathBuf::from("/tmp/report/report.pdf")).into();
        assert!(matches!(&missing, ApiError::ArtifactMissing(name) if name == "report.pdf"));

        let timeout: ApiError = ConversionError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(timeout, ApiError::ConversionTimeout(5)));

        let busy: ApiError = ConversionError::Busy(30).into();
        assert_eq!(busy.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn too_many_requests_sets_retry_after() {
        let response = ApiError::TooManyRequests(12).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("12"))
        );
    }
}
