//! Collection/request store seam.
//!
//! Persistence of collections is owned elsewhere; the relay only needs to turn
//! `(collection id, request id)` into the stored `{method, url, headers, body}`.
//! `InMemoryStore` backs the binary and the tests.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::{payload::header_pairs, DescriptorError, RequestBody, RequestDescriptor};

pub use memory::InMemoryStore;

/// Shared store handle used across handlers.
pub type SharedRequestStore = Arc<dyn RequestStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
}

/// A request as saved in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRequest {
    pub id: i64,
    pub name: String,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl StoredRequest {
    /// Stored data is validated like any caller input.
    pub fn to_descriptor(&self, default_timeout_ms: u64) -> Result<RequestDescriptor, DescriptorError> {
        let headers = header_pairs(self.headers.clone())?;
        RequestDescriptor::builder(self.method.as_str(), self.url.as_str())
            .headers(headers)
            .maybe_body(self.body.clone().and_then(RequestBody::from_value))
            .timeout_ms(self.timeout_ms.unwrap_or(default_timeout_ms))
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCollection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub requests: Vec<StoredRequest>,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn collection_exists(&self, collection_id: i64) -> Result<bool, StoreError>;

    async fn get_request(
        &self,
        collection_id: i64,
        request_id: i64,
    ) -> Result<Option<StoredRequest>, StoreError>;

    /// Resolve several IDs, in the order given. Unknown IDs are skipped.
    async fn get_requests(
        &self,
        collection_id: i64,
        request_ids: &[i64],
    ) -> Result<Vec<StoredRequest>, StoreError> {
        let mut found = Vec::with_capacity(request_ids.len());
        for id in request_ids {
            if let Some(request) = self.get_request(collection_id, *id).await? {
                found.push(request);
            }
        }
        Ok(found)
    }
}
