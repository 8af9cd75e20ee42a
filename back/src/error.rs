use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tick_api::v1::ErrorBody;
use tracing::{error, warn};

pub const TEXT_REQUIRED: &str = "Todo text is required";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("Todo not found")]
    NotFound,

    /// The store failed; only `action` is shown to the caller.
    #[error("{action}")]
    Store {
        action: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn store(action: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Store { action, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Json(_) | Self::Path(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Store { action, source } => error!(error = %source, "{action}"),
            _ => warn!(status = status.as_u16(), "{self}"),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
