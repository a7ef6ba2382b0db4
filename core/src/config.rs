//! Client configuration, fixed at construction.
//!
//! # Design
//! The three parser hooks live in `Parsers`, which is moved into the client
//! together with the rest of `ClientConfig`. `RestClient` offers no way to
//! swap a hook afterwards, so a client shared across threads always sees one
//! consistent set of parsers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{default_error_parser, default_response_parser, default_result_parser};
use crate::codec::Decode;
use crate::error::Result;
use crate::http::HttpResponse;

/// Decodes a 200 response body into the caller's destination.
pub type ResultParser =
    Arc<dyn Fn(&HttpResponse, Option<&mut dyn Decode>) -> Result<()> + Send + Sync>;

/// Turns a non-200 response into an error. Returning `Ok(())` makes the
/// request succeed.
pub type ErrorParser = Arc<dyn Fn(&HttpResponse) -> Result<()> + Send + Sync>;

/// Interprets a whole response, usually by delegating to the other two hooks.
pub type ResponseParser =
    Arc<dyn Fn(&Parsers, &HttpResponse, Option<&mut dyn Decode>) -> Result<()> + Send + Sync>;

/// The replaceable response-interpretation hooks of a client.
#[derive(Clone)]
pub struct Parsers {
    result: ResultParser,
    error: ErrorParser,
    response: ResponseParser,
}

impl Parsers {
    pub fn with_result_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&HttpResponse, Option<&mut dyn Decode>) -> Result<()> + Send + Sync + 'static,
    {
        self.result = Arc::new(parser);
        self
    }

    pub fn with_error_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&HttpResponse) -> Result<()> + Send + Sync + 'static,
    {
        self.error = Arc::new(parser);
        self
    }

    pub fn with_response_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&Parsers, &HttpResponse, Option<&mut dyn Decode>) -> Result<()> + Send + Sync + 'static,
    {
        self.response = Arc::new(parser);
        self
    }

    pub fn parse_result(&self, response: &HttpResponse, result: Option<&mut dyn Decode>) -> Result<()> {
        (self.result)(response, result)
    }

    pub fn parse_error(&self, response: &HttpResponse) -> Result<()> {
        (self.error)(response)
    }

    pub fn parse_response(&self, response: &HttpResponse, result: Option<&mut dyn Decode>) -> Result<()> {
        (self.response)(self, response, result)
    }
}

impl Default for Parsers {
    fn default() -> Self {
        Self {
            result: Arc::new(default_result_parser),
            error: Arc::new(default_error_parser),
            response: Arc::new(default_response_parser),
        }
    }
}

impl fmt::Debug for Parsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parsers").finish_non_exhaustive()
    }
}

/// Settings for a `RestClient`.
///
/// The default reproduces a bare client: built-in parsers, no timeout, no
/// body size limit, and the transport's own user agent.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub parsers: Parsers,
    /// Upper bound for a whole round trip, body read included.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Largest response body accepted, in bytes. `None` reads bodies of any
    /// size.
    pub max_body_size: Option<u64>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parsers(mut self, parsers: Parsers) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_max_body_size(mut self, bytes: u64) -> Self {
        self.max_body_size = Some(bytes);
        self
    }
}
