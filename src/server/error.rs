//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`oga2mp3_common::Error`] so that route
//! handlers can return `Result<T, AppError>` directly. Error bodies are plain
//! text: the caller gets the message, including transcoder diagnostics.

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: oga2mp3_common::Error,
}

impl AppError {
    pub fn new(inner: oga2mp3_common::Error) -> Self {
        Self { inner }
    }
}

impl From<oga2mp3_common::Error> for AppError {
    fn from(e: oga2mp3_common::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                stage = ?self.inner.stage(),
                error = %self.inner,
                "Server error in conversion handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self.inner, "Rejected request");
        }

        let mut response = (status, self.inner.to_string()).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response.headers_mut().insert(
                header::ALLOW,
                HeaderValue::from_static(Method::POST.as_str()),
            );
        }
        response
    }
}
