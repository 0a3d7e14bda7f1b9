use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serving a dashboard interaction
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source CSV could not be opened, read or parsed.
    #[error("sales data unavailable at {path}: {reason}")]
    DataSourceUnavailable { path: PathBuf, reason: String },

    /// A chart click, request body or stored dataset was missing required fields.
    #[error("invalid interaction payload: {0}")]
    InvalidInteractionPayload(String),

    /// Writing the working dataset to a download format failed.
    #[error("export failed: {0}")]
    Export(String),

    /// Drawing a chart image failed.
    #[error("chart rendering failed: {0}")]
    Render(String),
}

impl DashboardError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashboardError::DataSourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        DashboardError::InvalidInteractionPayload(reason.into())
    }
}

#[cfg(feature = "web")]
mod response {
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde::Serialize;

    use super::DashboardError;

    #[derive(Serialize)]
    struct ErrorResponse {
        status: String,
        message: String,
    }

    impl DashboardError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                DashboardError::DataSourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                DashboardError::InvalidInteractionPayload(_) => StatusCode::BAD_REQUEST,
                DashboardError::Export(_) | DashboardError::Render(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for DashboardError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            log::warn!("request failed with {}: {}", status, self);

            (
                status,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    message: self.to_string(),
                }),
            )
                .into_response()
        }
    }
}
