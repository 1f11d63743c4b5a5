//! Hash-indexed manifest lookup with caching and request coalescing
//!
//! Normalizes `hash -> GearAsset` queries across an ordered chain of
//! backing stores. Results (including "definitely absent") are cached
//! for the lifetime of the session; manifest data is treated as
//! immutable while the process runs, so entries are written once and
//! only ever read afterwards. Concurrent lookups for the same hash
//! share a single chain walk.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::networking::{LoadError, LoadResult};

use super::gear::GearAsset;
use super::stores::GearAssetStore;

/// Outcome of a manifest lookup. `NotFound` is an answer, not an
/// error: every store was asked and none carries the hash.
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(Arc<GearAsset>),
    NotFound,
}

impl Lookup {
    pub fn found(&self) -> Option<&Arc<GearAsset>> {
        match self {
            Lookup::Found(asset) => Some(asset),
            Lookup::NotFound => None,
        }
    }
}

/// Counters for cache behavior, mirrored into logs on demand.
#[derive(Debug, Default, Clone)]
pub struct LookupStats {
    pub requests: u64,
    pub cache_hits: u64,
    pub coalesced: u64,
    pub chain_walks: u64,
    pub not_found: u64,
}

#[derive(Default)]
struct LookupState {
    ready: HashMap<u32, Lookup>,
    pending: HashMap<u32, Vec<oneshot::Sender<LoadResult<Lookup>>>>,
}

enum Claim {
    Ready(Lookup),
    Wait(oneshot::Receiver<LoadResult<Lookup>>),
    Walk,
}

pub struct ManifestLookup {
    stores: Vec<Box<dyn GearAssetStore>>,
    state: Mutex<LookupState>,
    stats: Mutex<LookupStats>,
}

impl ManifestLookup {
    /// Build a lookup over an ordered store chain; earlier stores win.
    pub fn new(stores: Vec<Box<dyn GearAssetStore>>) -> Self {
        info!(
            "🗄️ Manifest lookup over {} store(s): {}",
            stores.len(),
            stores.iter().map(|s| s.name()).collect::<Vec<_>>().join(" → ")
        );
        Self {
            stores,
            state: Mutex::new(LookupState::default()),
            stats: Mutex::new(LookupStats::default()),
        }
    }

    /// Resolve a hash through the store chain.
    ///
    /// Cached results are served without touching any store. When the
    /// hash is already being resolved by another task, this call waits
    /// for that walk instead of starting its own.
    pub async fn resolve(&self, hash: u32) -> LoadResult<Lookup> {
        let claim = {
            let mut state = self.state.lock().await;
            let mut stats = self.stats.lock().await;
            stats.requests += 1;

            if let Some(hit) = state.ready.get(&hash) {
                stats.cache_hits += 1;
                Claim::Ready(hit.clone())
            } else if let Some(waiters) = state.pending.get_mut(&hash) {
                stats.coalesced += 1;
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Claim::Wait(rx)
            } else {
                state.pending.insert(hash, Vec::new());
                Claim::Walk
            }
        };

        match claim {
            Claim::Ready(hit) => Ok(hit),
            Claim::Wait(rx) => rx.await.unwrap_or_else(|_| {
                Err(LoadError::ManifestUnavailable {
                    reason: format!("coalesced lookup for {hash} was abandoned"),
                })
            }),
            Claim::Walk => {
                let outcome = self.walk_chain(hash).await;

                let waiters = {
                    let mut state = self.state.lock().await;
                    // Outages are transient; only real answers are cached.
                    if let Ok(lookup) = &outcome {
                        state.ready.insert(hash, lookup.clone());
                    }
                    state.pending.remove(&hash).unwrap_or_default()
                };
                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }

                outcome
            }
        }
    }

    async fn walk_chain(&self, hash: u32) -> LoadResult<Lookup> {
        {
            let mut stats = self.stats.lock().await;
            stats.chain_walks += 1;
        }

        let mut any_reachable = false;
        let mut last_transport: Option<String> = None;

        for store in &self.stores {
            match store.fetch(hash).await {
                Ok(Some(asset)) => {
                    debug!("manifest hash {} served by {}", hash, store.name());
                    return Ok(Lookup::Found(Arc::new(asset)));
                }
                Ok(None) => {
                    any_reachable = true;
                }
                Err(err) => {
                    // An erroring store is a miss for that store only;
                    // the chain keeps walking.
                    warn!("store {} failed for hash {}: {}", store.name(), hash, err);
                    if err.is_transport() {
                        last_transport = Some(err.to_string());
                    } else {
                        any_reachable = true;
                    }
                }
            }
        }

        if any_reachable {
            let mut stats = self.stats.lock().await;
            stats.not_found += 1;
            debug!("manifest hash {} absent from all stores", hash);
            Ok(Lookup::NotFound)
        } else {
            Err(LoadError::ManifestUnavailable {
                reason: last_transport.unwrap_or_else(|| "no stores configured".to_string()),
            })
        }
    }

    pub async fn stats(&self) -> LookupStats {
        self.stats.lock().await.clone()
    }

    /// Number of hashes with a cached answer (positive or negative).
    pub async fn cached_entries(&self) -> usize {
        self.state.lock().await.ready.len()
    }
}
