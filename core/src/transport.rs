//! Transports execute a built `HttpRequest` and report what came back.
//!
//! # Design
//! The pipeline depends only on the `Transport` trait. `UreqTransport` is the
//! default: it creates a fresh agent per call from the request's options,
//! so nothing is pooled and options can differ between calls. Closures with
//! the right signature are transports too, which is what tests use.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use ureq::tls::{PemItem, RootCerts, TlsConfig};
use ureq::{Agent, Proxy, RequestBuilder};

use crate::error::TransportError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::options::{self, TransportOptions};

/// Executes one HTTP round-trip synchronously.
///
/// Implementations must return `Ok` for every response the server sent,
/// whatever its status. `Err` is reserved for failures where no response
/// exists (DNS, connect, TLS, invalid options).
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = build_agent(&request.options)?;
        let url = request.url.as_str();

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(agent.post(url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(agent.put(url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // No size cap: a complete response always reaches status handling.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &Headers) -> RequestBuilder<B> {
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

/// Translate transport options into an agent. Status codes are returned as
/// data so the pipeline can interpret them.
///
/// Redirects are not followed unless `max_redirects` is set; a 3xx response
/// is handed back like any other status below 400.
fn build_agent(opts: &TransportOptions) -> Result<Agent, TransportError> {
    let mut config = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0);
    let mut tls = TlsConfig::builder();

    for (key, value) in opts.iter() {
        match key {
            options::TIMEOUT => config = config.timeout_global(Some(parse_secs(key, value)?)),
            options::CONNECT_TIMEOUT => {
                config = config.timeout_connect(Some(parse_secs(key, value)?))
            }
            options::USER_AGENT => config = config.user_agent(value),
            options::MAX_REDIRECTS => {
                let max = value
                    .parse::<u32>()
                    .map_err(|e| invalid_option(key, value, &e.to_string()))?;
                config = config.max_redirects(max);
            }
            options::PROXY => {
                let proxy =
                    Proxy::new(value).map_err(|e| invalid_option(key, value, &e.to_string()))?;
                config = config.proxy(Some(proxy));
            }
            options::CA_BUNDLE => tls = tls.root_certs(load_ca_bundle(value)?),
            options::INSECURE => {
                let insecure = value
                    .parse::<bool>()
                    .map_err(|e| invalid_option(key, value, &e.to_string()))?;
                tls = tls.disable_verification(insecure);
            }
            other => tracing::debug!(option = %other, "ignoring unknown transport option"),
        }
    }

    Ok(config.tls_config(tls.build()).build().new_agent())
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, TransportError> {
    let secs = value
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid_option(key, value, &e.to_string()))?;
    Duration::try_from_secs_f64(secs).map_err(|e| invalid_option(key, value, &e.to_string()))
}

fn load_ca_bundle(path: &str) -> Result<RootCerts, TransportError> {
    let pem = fs::read(path)
        .map_err(|e| TransportError::new(format!("failed to read CA bundle {path}: {e}")))?;

    let mut certs = Vec::new();
    for item in ureq::tls::parse_pem(&pem) {
        match item {
            Ok(PemItem::Certificate(cert)) => certs.push(cert.to_owned()),
            Ok(_) => {}
            Err(e) => return Err(TransportError::new(format!("invalid CA bundle {path}: {e}"))),
        }
    }
    if certs.is_empty() {
        return Err(TransportError::new(format!("CA bundle {path} contains no certificates")));
    }

    Ok(RootCerts::Specific(Arc::new(certs)))
}

fn invalid_option(key: &str, value: &str, reason: &str) -> TransportError {
    TransportError::new(format!("invalid transport option {key}={value}: {reason}"))
}
