//! Blocking JSON REST client and the error taxonomy it shares with
//! `restkit-server`.
//!
//! # Overview
//! `RestClient` sends one JSON request per call and interprets the answer
//! through three replaceable parsers (result, error, response). Non-200
//! answers become typed `ErrorResponse` values whose kind follows the HTTP
//! status; callers test them with the `is_status_*` predicates, which look
//! through any masking.
//!
//! # Design
//! - One taxonomy: `ErrorResponse` tagged with `ErrorKind` plus domain code
//!   and originating status.
//! - `mask` wraps an error with its origin; classification always works on
//!   the recovered cause.
//! - Parsers are part of `ClientConfig`, fixed once the client is built.
//! - No retries, no background work. Every call blocks the caller until the
//!   body is fully read or an error occurs.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;

pub use client::{
    default_error_parser, default_response_parser, default_result_parser, join_path, Query,
    RestClient,
};
pub use codec::{Decode, Encode};
pub use config::{ClientConfig, ErrorParser, Parsers, ResponseParser, ResultParser};
pub use error::{
    is_error_response_with_code, is_error_response_with_code_fn, is_status_bad_request,
    is_status_forbidden, is_status_internal_server, is_status_not_found,
    is_status_precondition_failed, is_status_unauthorized, mask, Error, ErrorBody, ErrorKind,
    ErrorResponse, Masked, Result, WireError,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
