use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use domains::ErrorKind;
use services::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("sign in required")]
    Unauthenticated,

    /// The page gate turned the caller away.
    #[error("redirect to {0}")]
    Redirect(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::ConnectivityFailed => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::ConflictFailed => StatusCode::CONFLICT,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Redirect(_) => StatusCode::SEE_OTHER,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Redirect(to) = self {
            return Redirect::to(to).into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
