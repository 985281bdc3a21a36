//! Transport options: opaque key/value settings forwarded to the transport.
//!
//! The pipeline never interprets these beyond merging and dropping the
//! reserved keys. What each key means is up to the transport; the constants
//! below are the ones `UreqTransport` understands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whole-call timeout in seconds (fractional allowed).
pub const TIMEOUT: &str = "timeout";
/// Connect timeout in seconds (fractional allowed).
pub const CONNECT_TIMEOUT: &str = "connect_timeout";
/// Path to a PEM bundle of CA certificates used to verify the server.
pub const CA_BUNDLE: &str = "ca_bundle";
/// Disable TLS verification when `true`.
pub const INSECURE: &str = "insecure";
pub const USER_AGENT: &str = "user_agent";
pub const MAX_REDIRECTS: &str = "max_redirects";
/// Proxy URL, e.g. `http://proxy.local:8080`.
pub const PROXY: &str = "proxy";

/// Keys owned by the pipeline. They are never forwarded.
pub const RESERVED: [&str; 4] = ["url", "method", "headers", "return_transfer"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOptions(BTreeMap<String, String>);

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `overrides` on `self` and strip reserved keys.
    pub fn merged_with(&self, overrides: &TransportOptions) -> TransportOptions {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.retain(|key, _| {
            let reserved = is_reserved(key);
            if reserved {
                tracing::warn!(option = %key, "ignoring pipeline-owned transport option");
            }
            !reserved
        });
        TransportOptions(merged)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TransportOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TransportOptions(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn is_reserved(key: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(key))
}
