use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Codes service error variants.
///
/// Empty outcomes (no unused code, no usage yet) and duplicate uploads are not errors; they
/// are reported through `Option`/counts by the store.
#[derive(Debug, thiserror::Error)]
pub enum CodesServiceError {
    #[error("forbidden")]
    Forbidden,
    #[error("no codes found")]
    NoCodesFound,
    #[error("unsupported upload")]
    UnsupportedUpload,
    #[error("confirmation required")]
    ConfirmationRequired,
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CodesServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::NoCodesFound => "NO_CODES_FOUND",
            Self::UnsupportedUpload => "UNSUPPORTED_UPLOAD",
            Self::ConfirmationRequired => "CONFIRMATION_REQUIRED",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CodesServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NoCodesFound | Self::ConfirmationRequired | Self::MissingData => {
                StatusCode::BAD_REQUEST
            }
            Self::UnsupportedUpload => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only, with the full anyhow chain. 4xx are expected operator errors.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
