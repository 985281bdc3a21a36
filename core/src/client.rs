//! The request pipeline: build, dispatch, interpret.
//!
//! # Design
//! `ApiClient` holds an immutable `ClientConfig` and a transport. Each verb
//! builds a `RequestSpec` and runs it through one private `request` method:
//! `build_request` turns the `RequestSpec` into an `HttpRequest`, the transport
//! executes it, and `parse_response` turns the result into a JSON value or
//! an `ApiError`. Build and parse are pure and public so they can be tested
//! and reused without the network.
//!
//! Precedence is uniform: per-call headers and options always win over the
//! client defaults.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::encoding::{build_url, encode_body};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Overrides, RequestSpec};

/// Synchronous JSON REST client.
///
/// Safe to share between threads when the transport is: calls only read
/// the configuration.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Turn `spec` into the exact request the transport will execute.
    pub fn build_request(&self, spec: &RequestSpec) -> Result<HttpRequest, ApiError> {
        let url = build_url(self.config.base_uri(), &spec.endpoint, &spec.query);
        let mut headers = self.config.default_headers().merged_with(&spec.overrides.headers);
        let body = match &spec.body {
            Some(value) => Some(encode_body(value, &mut headers)?),
            None => None,
        };
        let options = self
            .config
            .default_options()
            .merged_with(&spec.overrides.options);

        Ok(HttpRequest {
            method: spec.method,
            url,
            headers,
            body,
            options,
        })
    }

    /// Interpret a transport response.
    ///
    /// Status >= 400 is an `HttpStatus` error. Otherwise an empty body
    /// decodes to `null` and any other body must be valid JSON.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if response.status >= 400 {
            return Err(status_error(response));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl<T: Transport> ApiClient<T> {
    /// GET `endpoint` with `query` appended as a query string.
    pub fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        overrides: &Overrides,
    ) -> Result<Value, ApiError> {
        let mut spec = RequestSpec::new(HttpMethod::Get, endpoint).overrides(overrides.clone());
        for (key, value) in query {
            spec = spec.query(*key, *value);
        }
        self.request(spec)
    }

    pub fn post(
        &self,
        endpoint: &str,
        body: Option<&Value>,
        overrides: &Overrides,
    ) -> Result<Value, ApiError> {
        self.request(with_body(HttpMethod::Post, endpoint, body, overrides))
    }

    pub fn put(
        &self,
        endpoint: &str,
        body: Option<&Value>,
        overrides: &Overrides,
    ) -> Result<Value, ApiError> {
        self.request(with_body(HttpMethod::Put, endpoint, body, overrides))
    }

    pub fn delete(&self, endpoint: &str, overrides: &Overrides) -> Result<Value, ApiError> {
        self.request(RequestSpec::new(HttpMethod::Delete, endpoint).overrides(overrides.clone()))
    }

    fn request(&self, spec: RequestSpec) -> Result<Value, ApiError> {
        let request = self.build_request(&spec)?;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        tracing::trace!(
            request_line = %request.request_line(),
            headers = ?request.headers.redacted().to_lines(),
            "request"
        );

        let response = self.transport.execute(&request).map_err(|e| {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                error = %e,
                "transport failed"
            );
            ApiError::from(e)
        })?;
        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );

        self.parse_response(response)
    }
}

fn with_body(
    method: HttpMethod,
    endpoint: &str,
    body: Option<&Value>,
    overrides: &Overrides,
) -> RequestSpec {
    let spec = RequestSpec::new(method, endpoint).overrides(overrides.clone());
    match body {
        Some(value) => spec.body(value.clone()),
        None => spec,
    }
}

fn status_error(response: HttpResponse) -> ApiError {
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| response.body.clone());
    ApiError::HttpStatus {
        status: response.status,
        message,
        body: response.body,
    }
}
