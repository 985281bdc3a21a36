//! Per-call request descriptions.
//!
//! # Design
//! `RequestSpec` is what a verb operation hands to the pipeline. It is built
//! fresh for every call and consumed by it. `Overrides` is the per-call
//! slice of it that callers supply directly: extra headers and transport
//! options, both of which win over the client defaults.

use serde_json::Value;

use crate::http::{Headers, HttpMethod};
use crate::options::TransportOptions;

/// Per-call header and transport-option overrides.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub headers: Headers,
    pub options: TransportOptions,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.set(key, value);
        self
    }
}

/// Everything needed to build one request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub overrides: Overrides,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
            overrides: Overrides::default(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }
}
