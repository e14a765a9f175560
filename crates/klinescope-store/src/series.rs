//! Per-subscription series accumulation.
//!
//! `SeriesStore` owns every series for the lifetime of the process. Points
//! only enter through `append`; nothing else mutates a series. Each append
//! rewrites the whole persisted document for that key — one synchronous
//! write per point, no batching.

use crate::error::StoreResult;
use crate::kv::KeyValueStore;
use klinescope_core::{Candle, Series, SubscriptionKey};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// In-memory series per subscription key, persisted through a
/// `KeyValueStore` backend.
///
/// The in-memory state is authoritative. Backend failures surface as typed
/// errors for the caller to report; they never block ingestion.
pub struct SeriesStore<S> {
    backend: S,
    series: HashMap<String, Series>,
    hydrated: HashSet<String>,
}

impl<S: KeyValueStore> SeriesStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            series: HashMap::new(),
            hydrated: HashSet::new(),
        }
    }

    /// Restore the series for `key` from the backend, once per key.
    ///
    /// Returns the number of points restored. A missing value is `Ok(0)`.
    /// An unreadable backend or corrupt bytes leave the series empty and
    /// surface as an error; the caller reports it and carries on. Repeat
    /// calls for an already-hydrated key are no-ops, so the in-memory
    /// series stays authoritative across subscription switches.
    pub fn hydrate(&mut self, key: &SubscriptionKey) -> StoreResult<usize> {
        let namespace = key.namespace();
        if !self.hydrated.insert(namespace.clone()) {
            return Ok(0);
        }

        let Some(raw) = self.backend.get(&namespace)? else {
            debug!(%namespace, "No persisted series");
            return Ok(0);
        };

        let restored: Series = serde_json::from_str(&raw)?;
        let count = restored.len();
        debug!(%namespace, points = count, "Restored persisted series");
        self.series.insert(namespace, restored);
        Ok(count)
    }

    /// Append `candle` to the series for `key`, then persist the whole
    /// updated series under `key.namespace()`.
    ///
    /// The in-memory append always takes effect; an error means only that
    /// the persisted copy is now stale.
    pub fn append(&mut self, key: &SubscriptionKey, candle: Candle) -> StoreResult<()> {
        let namespace = key.namespace();
        let series = self.series.entry(namespace.clone()).or_default();
        series.push(candle);

        let encoded = serde_json::to_string(series)?;
        self.backend.set(&namespace, &encoded)
    }

    /// Present in-memory series for `key`. Never touches the backend.
    pub fn current(&self, key: &SubscriptionKey) -> &[Candle] {
        self.series
            .get(&key.namespace())
            .map(Series::points)
            .unwrap_or(&[])
    }
}
