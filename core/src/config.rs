//! Client configuration.
//!
//! A `ClientConfig` is fixed once it is handed to `ApiClient`. It can be
//! assembled with the builder methods or deserialized, e.g. from JSON:
//!
//! ```
//! use api_client_core::ClientConfig;
//!
//! let config: ClientConfig = serde_json::from_str(r#"{
//!     "base_uri": "https://jsonplaceholder.typicode.com/",
//!     "default_headers": [["Accept", "application/json"]],
//!     "default_options": {"timeout": "10"}
//! }"#).unwrap();
//! assert_eq!(config.base_uri(), "https://jsonplaceholder.typicode.com");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::Headers;
use crate::options::{self, TransportOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    base_uri: String,
    #[serde(default)]
    default_headers: Headers,
    #[serde(default)]
    default_options: TransportOptions,
}

impl ClientConfig {
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            default_headers: Headers::new(),
            default_options: TransportOptions::new(),
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.default_headers = self.default_headers.merged_with(&headers);
        self
    }

    /// Add a transport option applied to every request.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_options.set(key, value);
        self
    }

    /// Verify servers against the PEM bundle at `path` instead of the
    /// transport's built-in roots.
    pub fn with_ca_bundle(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.with_option(options::CA_BUNDLE, path)
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_option(options::TIMEOUT, timeout.as_secs_f64().to_string())
    }

    /// Base URI without trailing slashes.
    pub fn base_uri(&self) -> &str {
        self.base_uri.trim_end_matches('/')
    }

    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    pub fn default_options(&self) -> &TransportOptions {
        &self.default_options
    }
}
