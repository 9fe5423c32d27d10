//! Caller-owned memoization of hotspot reports.
//!
//! A run is a pure function of the record set, the offence type and the
//! parameters, so a report can be reused for as long as the caller keeps
//! the same dataset loaded. The cache holds no global state; dropping it or
//! calling [`HotspotCache::invalidate_dataset`] is the only invalidation.

use std::collections::BTreeMap;
use std::sync::Arc;

use hotspot_map_complaint_models::RawComplaintRecord;
use hotspot_map_hotspot_models::{HotspotParams, HotspotReport, InvalidParamsError};
use sha2::{Digest, Sha256};

use crate::compute_hotspots;

/// SHA-256 digest identifying an ordered record set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetFingerprint(String);

impl DatasetFingerprint {
    /// Hashes every field of every record, in order.
    #[must_use]
    pub fn of(records: &[RawComplaintRecord]) -> Self {
        let mut hasher = Sha256::new();

        for record in records {
            hash_field(&mut hasher, Some(&record.id));
            hash_field(&mut hasher, Some(&record.offence_type));
            hash_field(&mut hasher, record.position.as_deref());
            hash_field(&mut hasher, Some(&record.location_label));
            hash_field(&mut hasher, record.timestamp.as_deref());
            hash_field(&mut hasher, record.status.as_deref());
            hash_field(&mut hasher, record.resolution_image_ref.as_deref());
            hash_field(&mut hasher, record.offence_image_ref.as_deref());
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// The hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length-prefixed so that field boundaries and `None` are unambiguous.
fn hash_field(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            hasher.update((v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CacheKey {
    dataset: DatasetFingerprint,
    offence_type: String,
    params: String,
}

/// Memoized hotspot reports keyed by dataset, offence type and parameters.
#[derive(Debug, Default)]
pub struct HotspotCache {
    entries: BTreeMap<CacheKey, Arc<HotspotReport>>,
    hits: u64,
    misses: u64,
}

impl HotspotCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached report or computes and stores it.
    ///
    /// `dataset` must be the fingerprint of `records`; computing it once
    /// per loaded dataset avoids rehashing on every lookup.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParamsError`] if `params` are invalid. Nothing is
    /// cached in that case.
    pub fn get_or_compute(
        &mut self,
        dataset: &DatasetFingerprint,
        records: &[RawComplaintRecord],
        offence_type: &str,
        params: &HotspotParams,
    ) -> Result<Arc<HotspotReport>, InvalidParamsError> {
        let key = CacheKey {
            dataset: dataset.clone(),
            offence_type: offence_type.to_owned(),
            params: params.cache_key(),
        };

        if let Some(report) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("Hotspot cache hit for '{offence_type}'");
            return Ok(Arc::clone(report));
        }

        self.misses += 1;
        log::debug!("Hotspot cache miss for '{offence_type}'");

        let report = Arc::new(compute_hotspots(records, offence_type, params)?);
        self.entries.insert(key, Arc::clone(&report));
        Ok(report)
    }

    /// Drops every report computed from `dataset`.
    pub fn invalidate_dataset(&mut self, dataset: &DatasetFingerprint) {
        self.entries.retain(|key, _| &key.dataset != dataset);
    }

    /// Drops every report.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
