//! Response body decoding driven by the `Content-Type` header.

use serde_json::Value;

/// How a response body is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Json,
    Text,
}

type Predicate = fn(&str) -> bool;

/// Evaluated in order against the lowercased media type (parameters stripped).
const JSON_PREDICATES: [Predicate; 3] = [is_application_json, is_text_json, has_json_suffix];

fn is_application_json(essence: &str) -> bool {
    essence == "application/json"
}

fn is_text_json(essence: &str) -> bool {
    essence == "text/json"
}

/// Structured syntax suffix, e.g. `application/problem+json`.
fn has_json_suffix(essence: &str) -> bool {
    essence.ends_with("+json")
}

impl DecodeStrategy {
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return DecodeStrategy::Text;
        };
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if JSON_PREDICATES.iter().any(|matches| matches(&essence)) {
            DecodeStrategy::Json
        } else {
            DecodeStrategy::Text
        }
    }

    /// Malformed JSON degrades to raw text instead of failing.
    pub fn decode(&self, body: &[u8]) -> Value {
        if *self == DecodeStrategy::Json {
            match serde_json::from_slice(body) {
                Ok(value) => return value,
                Err(e) => {
                    tracing::debug!(error = %e, "JSON content-type with undecodable body, returning text");
                }
            }
        }
        Value::String(String::from_utf8_lossy(body).into_owned())
    }
}
