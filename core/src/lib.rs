//! Synchronous client core for JSON REST APIs.
//!
//! # Overview
//! `ApiClient` exposes `get`, `post`, `put` and `delete`. Each call builds
//! exactly one HTTP request from the client configuration plus per-call
//! overrides, executes it through a `Transport`, and returns the decoded
//! JSON body or an `ApiError`. There are no retries, no caching and no
//! state carried between calls.
//!
//! ```no_run
//! use api_client_core::{ApiClient, ClientConfig, Overrides};
//! use serde_json::json;
//!
//! let client = ApiClient::new(ClientConfig::new("https://jsonplaceholder.typicode.com"));
//! let post = client.get("/posts/1", &[], &Overrides::new())?;
//! let body = json!({"title": "t", "userId": 1});
//! let created = client.post("/posts", Some(&body), &Overrides::new())?;
//! # Ok::<(), api_client_core::ApiError>(())
//! ```
//!
//! # Design
//! - Build and parse are pure (`ApiClient::build_request`,
//!   `ApiClient::parse_response`); only the transport touches the network.
//! - Per-call headers and transport options always override the defaults.
//! - Bodies are `serde_json::Value`; they go out as JSON unless the
//!   content type asks for form encoding.
//! - A successful empty body decodes to `null`; any other non-JSON body is
//!   an `ApiError::Decode`.

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, TransportError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse};
pub use options::TransportOptions;
pub use transport::{Transport, UreqTransport};
pub use types::{Overrides, RequestSpec};
