//! Error taxonomy shared by the REST client and the server helpers.
//!
//! # Design
//! Every typed failure is an `ErrorResponse` tagged with an `ErrorKind`. The
//! classification predicates inspect the kind of the *recovered cause*, so a
//! masked error classifies exactly like the error it wraps. Transport and
//! codec failures keep their own variants and never match a kind predicate.
//!
//! The wire body is `{"error": {"message": "...", "code": 42}}`. Neither the
//! kind nor the originating status is serialized; the receiving side derives
//! them from the HTTP status line.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Status class of a typed error. Each kind is bound to one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400, also known as BadRequest.
    InvalidArgument,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 412
    PreconditionFailed,
    /// 500, and the fallback for every status not listed above.
    InternalServerError,
}

impl ErrorKind {
    /// HTTP status bound to this kind.
    pub const fn status(self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::PreconditionFailed => 412,
            ErrorKind::InternalServerError => 500,
        }
    }

    /// Classify an HTTP status. Unlisted statuses fall back to
    /// `InternalServerError`.
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::InvalidArgument,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            412 => ErrorKind::PreconditionFailed,
            _ => ErrorKind::InternalServerError,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not found",
            ErrorKind::PreconditionFailed => "precondition failed",
            ErrorKind::InternalServerError => "internal server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inner object of the wire error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i64,
}

/// Wire error body as it travels over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub error: ErrorBody,
}

fn is_zero(code: &i64) -> bool {
    *code == 0
}

/// A typed REST error: message, domain code, kind and originating status.
///
/// Built through the status-bound factories (`not_found`, `forbidden`, ...),
/// through `new` for an unclassified error, or by the client from a non-200
/// response via `from_status`. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    kind: Option<ErrorKind>,
    status: Option<u16>,
    message: String,
    code: i64,
}

impl ErrorResponse {
    /// An unclassified error. The server helpers emit it with status 400.
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            kind: None,
            status: None,
            message: message.into(),
            code,
        }
    }

    pub fn with_kind(kind: ErrorKind, message: impl Into<String>, code: i64) -> Self {
        Self {
            kind: Some(kind),
            status: Some(kind.status()),
            message: message.into(),
            code,
        }
    }

    pub fn bad_request(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::InvalidArgument, message, code)
    }

    pub fn unauthorized(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::Unauthorized, message, code)
    }

    pub fn forbidden(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::Forbidden, message, code)
    }

    pub fn not_found(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::NotFound, message, code)
    }

    pub fn precondition_failed(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::PreconditionFailed, message, code)
    }

    pub fn internal_server_error(message: impl Into<String>, code: i64) -> Self {
        Self::with_kind(ErrorKind::InternalServerError, message, code)
    }

    /// Error for a non-200 response. The kind follows the status table and the
    /// originating status is kept even when it is not listed there.
    pub fn from_status(status: u16, body: ErrorBody) -> Self {
        Self {
            kind: Some(ErrorKind::from_status(status)),
            status: Some(status),
            message: body.message,
            code: body.code,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// Status that produced (or is bound to) this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    /// Status to answer with when re-emitting this error: the originating
    /// status if it is a 4xx/5xx, else the kind's status, else 400.
    pub fn response_status(&self) -> u16 {
        self.status
            .filter(|status| (400..=599).contains(status))
            .or(self.kind.map(ErrorKind::status))
            .unwrap_or(400)
    }

    pub fn to_wire(&self) -> WireError {
        WireError {
            error: ErrorBody {
                message: self.message.clone(),
                code: self.code,
            },
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl Serialize for ErrorResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

/// Errors returned by the client, the parser hooks and the server helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// A typed REST error.
    #[error(transparent)]
    Response(#[from] ErrorResponse),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request body could not be serialized to JSON.
    #[error("JSON encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body could not be deserialized.
    #[error("JSON decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// Network I/O, including reading the response body.
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// Any foreign error raised by caller code.
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Masked(#[from] Masked),
}

impl Error {
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Custom(err.into())
    }

    /// Strip every masking layer.
    pub fn cause(&self) -> &Error {
        match self {
            Error::Masked(masked) => masked.cause(),
            other => other,
        }
    }

    /// The typed error behind any masking, if the cause is one.
    pub fn as_error_response(&self) -> Option<&ErrorResponse> {
        match self.cause() {
            Error::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_error_response().and_then(ErrorResponse::kind)
    }
}

/// Diagnostic wrapper recording where an error was passed up.
///
/// Displays exactly like the wrapped error; classification always looks
/// through it.
#[derive(Debug)]
pub struct Masked {
    inner: Box<Error>,
    location: &'static Location<'static>,
}

impl Masked {
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The innermost unmasked error.
    pub fn cause(&self) -> &Error {
        self.inner.cause()
    }

    pub fn into_inner(self) -> Error {
        *self.inner
    }
}

impl fmt::Display for Masked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for Masked {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Wrap `err`, recording the caller's location.
#[track_caller]
pub fn mask(err: impl Into<Error>) -> Error {
    Error::Masked(Masked {
        inner: Box::new(err.into()),
        location: Location::caller(),
    })
}

fn is_kind(err: &Error, kind: ErrorKind) -> bool {
    err.kind() == Some(kind)
}

pub fn is_status_bad_request(err: &Error) -> bool {
    is_kind(err, ErrorKind::InvalidArgument)
}

pub fn is_status_unauthorized(err: &Error) -> bool {
    is_kind(err, ErrorKind::Unauthorized)
}

pub fn is_status_forbidden(err: &Error) -> bool {
    is_kind(err, ErrorKind::Forbidden)
}

pub fn is_status_not_found(err: &Error) -> bool {
    is_kind(err, ErrorKind::NotFound)
}

pub fn is_status_precondition_failed(err: &Error) -> bool {
    is_kind(err, ErrorKind::PreconditionFailed)
}

pub fn is_status_internal_server(err: &Error) -> bool {
    is_kind(err, ErrorKind::InternalServerError)
}

/// True iff the cause is a typed error carrying domain `code`, whatever its
/// kind or status.
pub fn is_error_response_with_code(err: &Error, code: i64) -> bool {
    err.as_error_response().is_some_and(|r| r.code() == code)
}

pub fn is_error_response_with_code_fn(code: i64) -> impl Fn(&Error) -> bool {
    move |err| is_error_response_with_code(err, code)
}
