//! axum response helpers speaking the same JSON conventions as
//! `restkit_core::RestClient`.
//!
//! # Design
//! `json`, `text` and `html` write a body with a fixed content type and the
//! given status. `error` is the mirror image of the client's error parser: it
//! recovers the typed cause of any `restkit_core::Error` and answers with that
//! error's status and wire body. Anything untyped becomes a 400 carrying the
//! error's message with no domain code.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use restkit_core::{mask, Error, ErrorResponse};
use serde::Serialize;
use tracing::debug;

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// JSON response with `status`. `None` produces an empty body that still
/// carries the JSON content type.
pub fn json<T: Serialize + ?Sized>(result: Option<&T>, status: StatusCode) -> Result<Response, Error> {
    let Some(result) = result else {
        return Ok(empty_json(status));
    };
    let body = serde_json::to_vec(result).map_err(|e| mask(Error::Encode(e)))?;
    Ok(with_content_type(status, APPLICATION_JSON, body))
}

/// Empty body with the JSON content type.
pub fn empty_json(status: StatusCode) -> Response {
    with_content_type(status, APPLICATION_JSON, Vec::new())
}

/// Plain-text response; `content` is written verbatim.
pub fn text(content: impl Into<String>, status: StatusCode) -> Response {
    with_content_type(status, TEXT_PLAIN, content.into())
}

/// HTML response; `content` is written verbatim.
pub fn html(content: impl Into<String>, status: StatusCode) -> Response {
    with_content_type(status, TEXT_HTML, content.into())
}

fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: impl IntoResponse,
) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response()
}

/// Answer with the wire form of `err`.
///
/// A typed cause keeps its message and code and answers with its originating
/// status, else its kind's status, else 400. Any other error answers 400 with
/// its message and no code.
pub fn error(err: &Error) -> Response {
    let response = match err.as_error_response() {
        Some(typed) => typed.clone(),
        None => ErrorResponse::new(err.to_string(), 0),
    };
    let status =
        StatusCode::from_u16(response.response_status()).unwrap_or(StatusCode::BAD_REQUEST);
    debug!(status = status.as_u16(), kind = ?response.kind(), "writing error response");
    (status, Json(response.to_wire())).into_response()
}

/// Handler error that renders through [`error`].
///
/// Anything convertible into `restkit_core::Error` converts into it, so
/// handlers returning `Result<_, ApiFailure>` can use `?` directly.
#[derive(Debug)]
pub struct ApiFailure(pub Error);

impl ApiFailure {
    pub fn into_inner(self) -> Error {
        self.0
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        error(&self.0)
    }
}

impl<E> From<E> for ApiFailure
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
