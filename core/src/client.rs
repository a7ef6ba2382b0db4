//! Blocking JSON-over-HTTP client with pluggable response parsing.
//!
//! # Design
//! `RestClient` holds a fixed base URL, a `ureq` agent and an immutable
//! `ClientConfig`. A call is split the same way as the plain-data types in
//! `http`: `build_request` joins the URL and encodes the body without any
//! I/O, `execute` performs one round trip on the calling thread and hands the
//! fully read `HttpResponse` to the configured `ResponseParser`.
//!
//! The agent is built with `http_status_as_error(false)` so 4xx/5xx answers
//! come back as data and classification stays with the parsers.

use std::fmt;

use tracing::debug;
use url::Url;

use crate::codec::{Decode, Encode};
use crate::config::{ClientConfig, Parsers};
use crate::error::{mask, Error, ErrorResponse, Result, WireError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const APPLICATION_JSON: &str = "application/json";

/// Query parameters as `(name, value)` pairs, encoded in order.
pub type Query<'a> = [(&'a str, &'a str)];

/// Synchronous REST client bound to one base URL.
#[derive(Clone)]
pub struct RestClient {
    base_url: Url,
    agent: ureq::Agent,
    config: ClientConfig,
}

impl RestClient {
    /// Client with the built-in parsers and no timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| mask(e))?;
        if base_url.cannot_be_a_base() {
            return Err(mask(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Ok(Self {
            base_url,
            agent,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform one request.
    ///
    /// `path` is joined to the base URL's path, `query` replaces the base
    /// URL's query string when given (an empty slice clears it), `body` is sent as JSON when given, and a 200 body is
    /// decoded into `result` when given. Without a `result` the body is
    /// discarded.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&Query<'_>>,
        body: Option<&dyn Encode>,
        result: Option<&mut dyn Decode>,
    ) -> Result<()> {
        let request = self.build_request(method, path, query, body)?;
        self.execute(request, result)
    }

    /// Resolve the URL and encode the body. An encoding failure is returned
    /// before anything is sent.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&Query<'_>>,
        body: Option<&dyn Encode>,
    ) -> Result<HttpRequest> {
        let mut url = self.base_url.clone();
        url.set_path(&join_path(self.base_url.path(), path));
        if let Some(pairs) = query {
            url.set_query(None);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        let mut headers = vec![("accept".to_string(), APPLICATION_JSON.to_string())];
        let body = match body {
            Some(body) => {
                let content = body.to_json().map_err(|e| mask(Error::Encode(e)))?;
                headers.push(("content-type".to_string(), APPLICATION_JSON.to_string()));
                Some(content)
            }
            None => None,
        };
        if let Some(user_agent) = &self.config.user_agent {
            headers.push(("user-agent".to_string(), user_agent.clone()));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Send `request` and run the configured `ResponseParser` on the answer.
    pub fn execute(&self, request: HttpRequest, result: Option<&mut dyn Decode>) -> Result<()> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.send(request).map_err(|e| mask(e))?;
        debug!(
            status = response.status,
            body_len = response.body.len(),
            "received response"
        );
        self.config
            .parsers
            .parse_response(&response, result)
            .map_err(|e| mask(e))
    }

    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ureq::Error> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let url = url.as_str();

        let mut response = match method {
            HttpMethod::Get => send_without_body(self.agent.get(url), &headers, body),
            HttpMethod::Delete => send_without_body(self.agent.delete(url), &headers, body),
            HttpMethod::Head => send_without_body(self.agent.head(url), &headers, body),
            HttpMethod::Post => send_with_body(self.agent.post(url), &headers, body),
            HttpMethod::Put => send_with_body(self.agent.put(url), &headers, body),
            HttpMethod::Patch => send_with_body(self.agent.patch(url), &headers, body),
        }?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // Reading to the end releases the connection back to the agent.
        let limit = self.config.max_body_size.unwrap_or(u64::MAX);
        let body = response.body_mut().with_config().limit(limit).read_to_vec()?;

        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

type TransportResult = std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>;

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_without_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
    headers: &[(String, String)],
    body: Option<Vec<u8>>,
) -> TransportResult {
    match body {
        None => with_headers(builder, headers).call(),
        Some(body) => send_with_body(builder.force_send_body(), headers, Some(body)),
    }
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    headers: &[(String, String)],
    body: Option<Vec<u8>>,
) -> TransportResult {
    let builder = with_headers(builder, headers);
    match body {
        Some(body) => builder.send(&body[..]),
        None => builder.send_empty(),
    }
}

/// Join `relative` onto `base`.
///
/// Empty and `.` segments are dropped. `..` only removes segments that came
/// from `relative`, so the result always starts with the base path. A
/// leading `/` on `relative` does not make it absolute.
pub fn join_path(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let floor = segments.len();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.len() > floor {
                    segments.pop();
                }
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Status 200 goes to the result parser, anything else to the error parser.
pub fn default_response_parser(
    parsers: &Parsers,
    response: &HttpResponse,
    result: Option<&mut dyn Decode>,
) -> Result<()> {
    if response.is_ok() {
        parsers.parse_result(response, result).map_err(|e| mask(e))
    } else {
        parsers.parse_error(response).map_err(|e| mask(e))
    }
}

/// Decode the body into `result`; ignore it when there is no destination.
pub fn default_result_parser(response: &HttpResponse, result: Option<&mut dyn Decode>) -> Result<()> {
    if let Some(result) = result {
        result
            .decode_json(&response.body)
            .map_err(|e| mask(Error::Decode(e)))?;
    }
    Ok(())
}

/// Parse the wire error body (if any) and classify by status.
///
/// A non-empty body that is not a JSON object fails with `Error::Decode`.
pub fn default_error_parser(response: &HttpResponse) -> Result<()> {
    let wire = if response.body.is_empty() {
        WireError::default()
    } else {
        serde_json::from_slice::<WireError>(&response.body).map_err(|e| mask(Error::Decode(e)))?
    };
    Err(mask(ErrorResponse::from_status(response.status, wire.error)))
}
