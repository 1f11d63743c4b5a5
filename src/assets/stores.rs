//! Backing stores for hash-indexed gear definitions
//!
//! Three stores cover a hash between them, each with its own schema:
//! a local gear-asset table export, the content-addressed store, and
//! the remote per-hash definition endpoint. The chain in
//! [`crate::assets::manifest`] queries them in that order.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::gear::{ContentRecord, GearAsset, GearTableRecord, RemoteDefinitionRecord, SourceRecord};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached at all.
    #[error("store transport failure: {reason}")]
    Transport { reason: String },

    /// The store answered, but with a payload we could not make sense of.
    #[error("store payload malformed: {reason}")]
    Decode { reason: String },
}

impl StoreError {
    /// Decode failures still prove the store was reachable; only
    /// transport failures count toward a manifest-wide outage.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }
}

#[async_trait]
pub trait GearAssetStore: Send + Sync {
    fn name(&self) -> &str;

    /// Look up one hash. `Ok(None)` means the store is healthy but has
    /// no record for the hash.
    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError>;
}

// ---------------------------------------------------------------------------
// Local gear-asset table
// ---------------------------------------------------------------------------

/// In-memory index over a local gear-asset table export, keyed by hash.
#[derive(Debug)]
pub struct GearAssetTable {
    records: HashMap<u32, GearTableRecord>,
}

impl GearAssetTable {
    pub fn new(records: HashMap<u32, GearTableRecord>) -> Self {
        Self { records }
    }

    /// Parse a table export of the form `{"<hash>": {record}, ...}`.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, StoreError> {
        let raw: HashMap<String, GearTableRecord> = serde_json::from_slice(data)
            .map_err(|e| StoreError::Decode { reason: e.to_string() })?;

        let mut records = HashMap::with_capacity(raw.len());
        for (key, record) in raw {
            let hash: u32 = key
                .parse()
                .map_err(|_| StoreError::Decode { reason: format!("non-numeric hash key {key}") })?;
            records.insert(hash, record);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl GearAssetStore for GearAssetTable {
    fn name(&self) -> &str {
        "gear-asset-table"
    }

    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError> {
        Ok(self
            .records
            .get(&hash)
            .cloned()
            .map(|rec| SourceRecord::GearTable(rec).normalize(hash)))
    }
}

// ---------------------------------------------------------------------------
// Content-addressed store
// ---------------------------------------------------------------------------

/// HTTP store serving content-addressed gear records under
/// `{base}/gear/{hash}.json`.
pub struct ContentStore {
    http: reqwest::Client,
    base_url: Url,
}

impl ContentStore {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl GearAssetStore for ContentStore {
    fn name(&self) -> &str {
        "content-store"
    }

    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError> {
        let url = self
            .base_url
            .join(&format!("gear/{hash}.json"))
            .map_err(|e| StoreError::Decode { reason: e.to_string() })?;

        debug!("content store fetch {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transport { reason: e.to_string() })?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Transport {
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transport { reason: e.to_string() })?;
        let record: ContentRecord = serde_json::from_slice(&body)
            .map_err(|e| StoreError::Decode { reason: e.to_string() })?;

        Ok(Some(SourceRecord::Content(record).normalize(hash)))
    }
}

// ---------------------------------------------------------------------------
// Remote per-hash definition endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DefinitionEnvelope {
    #[serde(rename = "Response")]
    response: Option<RemoteDefinitionRecord>,
}

/// Last-resort store hitting the platform's per-hash definition
/// endpoint. Requires an API key but no bearer token.
pub struct RemoteDefinitionStore {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl RemoteDefinitionStore {
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self { http, base_url, api_key: api_key.into() }
    }
}

#[async_trait]
impl GearAssetStore for RemoteDefinitionStore {
    fn name(&self) -> &str {
        "remote-definitions"
    }

    async fn fetch(&self, hash: u32) -> Result<Option<GearAsset>, StoreError> {
        let url = self
            .base_url
            .join(&format!("Manifest/DestinyGearAssetsDefinition/{hash}/"))
            .map_err(|e| StoreError::Decode { reason: e.to_string() })?;

        debug!("remote definition fetch {}", url);

        let response = self
            .http
            .get(url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Transport { reason: e.to_string() })?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Transport {
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transport { reason: e.to_string() })?;
        let envelope: DefinitionEnvelope = serde_json::from_slice(&body)
            .map_err(|e| StoreError::Decode { reason: e.to_string() })?;

        // The platform wraps "no such entity" in a 200 with an empty body.
        Ok(envelope
            .response
            .map(|rec| SourceRecord::Remote(rec).normalize(hash)))
    }
}
