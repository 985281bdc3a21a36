//! URL joining and request body encoding.

use serde_json::Value;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::Headers;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Join `base` and `endpoint` with exactly one `/`, then append the query
/// string when `query` is non-empty. No other normalisation is done.
pub fn build_url(base: &str, endpoint: &str, query: &[(String, String)]) -> String {
    let mut url = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    if !query.is_empty() {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in query {
            serializer.append_pair(key, value);
        }
        url.push('?');
        url.push_str(&serializer.finish());
    }
    url
}

/// Encode `body` for the content type implied by `headers`.
///
/// Form bodies are used when the content type mentions
/// `application/x-www-form-urlencoded`; anything else is sent as JSON. When
/// no content type was given, `Content-Type: application/json` is appended.
pub fn encode_body(body: &Value, headers: &mut Headers) -> Result<String, ApiError> {
    let content_type = headers
        .get("content-type")
        .unwrap_or(JSON_CONTENT_TYPE)
        .to_ascii_lowercase();

    if content_type.contains(FORM_CONTENT_TYPE) {
        return form_encode(body);
    }

    let encoded = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
    if !headers.contains("content-type") {
        headers.insert("Content-Type", JSON_CONTENT_TYPE);
    }
    Ok(encoded)
}

/// Form-urlencode an object or array body.
///
/// Nested containers flatten to bracketed keys (`a[b]=1`, `a[0]=x`),
/// booleans become `1`/`0` and nulls are skipped.
pub fn form_encode(body: &Value) -> Result<String, ApiError> {
    let mut pairs = Vec::new();
    match body {
        Value::Object(map) => {
            for (key, value) in map {
                flatten(key.clone(), value, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (idx, value) in items.iter().enumerate() {
                flatten(idx.to_string(), value, &mut pairs);
            }
        }
        other => {
            return Err(ApiError::Encode(format!(
                "form body must be an object or array, got {}",
                type_name(other)
            )))
        }
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    Ok(serializer.finish())
}

fn flatten(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{idx}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
