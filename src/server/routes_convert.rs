//! `POST /convert`: upload OGA, receive MP3.

use axum::body::Body;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use oga2mp3_common::paths::{download_file_name, OUTPUT_MIME_TYPE};
use oga2mp3_common::Error;

use super::error::AppError;
use super::AppContext;

/// Convert the request body from OGA to MP3 and stream the result back.
///
/// The whole body is treated as one opaque audio blob. Artifacts are removed
/// on every failure path before the error is returned, and after the
/// response body has been sent on success.
pub async fn convert(
    State(ctx): State<AppContext>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(reject_body)?;

    let converted = ctx.conversions.convert(&body).await?;
    // The upload is on disk now; don't hold a second copy while streaming.
    drop(body);

    let size = converted.size();
    tracing::debug!(id = %converted.id(), size, "Streaming converted audio");
    let disposition = format!(
        "attachment; filename={}",
        download_file_name(chrono::Utc::now().timestamp())
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(OUTPUT_MIME_TYPE))
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(converted.into_stream()))
        .map_err(|e| AppError::new(Error::internal(format!("failed to build response: {e}"))))
}

/// Any method other than POST on `/convert`.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::new(Error::method_not_allowed(method.as_str()))
}

fn reject_body(rejection: BytesRejection) -> AppError {
    let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::payload_too_large(rejection.body_text())
    } else {
        Error::bad_request(format!(
            "failed to read request body: {}",
            rejection.body_text()
        ))
    };
    AppError::new(err)
}
