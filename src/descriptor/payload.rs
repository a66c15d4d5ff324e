//! Wire shape of a relay request: `{url, method, headers?, body?, timeout?}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DescriptorError, RequestBody, RequestDescriptor};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyPayload {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ProxyPayload {
    /// Validate into a descriptor; `default_timeout_ms` fills a missing `timeout`.
    pub fn into_descriptor(self, default_timeout_ms: u64) -> Result<RequestDescriptor, DescriptorError> {
        let headers = header_pairs(self.headers.unwrap_or_default())?;
        RequestDescriptor::builder(self.method, self.url)
            .headers(headers)
            .maybe_body(self.body.and_then(RequestBody::from_value))
            .timeout_ms(self.timeout.unwrap_or(default_timeout_ms))
            .build()
    }

    pub fn from_descriptor(descriptor: &RequestDescriptor) -> Self {
        let headers: Map<String, Value> = descriptor
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
            })
            .collect();

        Self {
            url: descriptor.url().to_string(),
            method: descriptor.method().to_string(),
            headers: (!headers.is_empty()).then_some(headers),
            body: descriptor.body().map(RequestBody::to_value),
            timeout: Some(descriptor.timeout_ms()),
        }
    }
}

/// Header objects map names to strings; anything else is a validation failure.
pub fn header_pairs(headers: Map<String, Value>) -> Result<Vec<(String, String)>, DescriptorError> {
    headers
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(v) => Ok((name, v)),
            _ => Err(DescriptorError::InvalidHeaderValue(name)),
        })
        .collect()
}
