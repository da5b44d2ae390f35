//! Fingerprint-keyed memoization of asset moments.
//!
//! `MomentsCache` holds at most one [`AssetMoments`] value together with the
//! key of the return series it was computed from: asset names, shape and a
//! content fingerprint. A lookup with a different series recomputes and
//! replaces the entry; `invalidate` drops it. A failed estimate leaves the
//! previous entry in place.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::error::Result;
use crate::metrics::AssetMoments;
use crate::model::ReturnSeries;

/// Content fingerprint of a return series: asset names, shape and the bit
/// pattern of every cell.
pub fn fingerprint(returns: &ReturnSeries) -> u64 {
    let mut hasher = FxHasher::default();
    returns.assets().hash(&mut hasher);
    returns.shape().hash(&mut hasher);
    for cell in returns.cells() {
        cell.map(f64::to_bits).hash(&mut hasher);
    }
    hasher.finish()
}

/// Identity of a return series as seen by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeriesKey {
    assets: Vec<String>,
    shape: (usize, usize),
    fingerprint: u64,
}

impl SeriesKey {
    fn of(returns: &ReturnSeries) -> Self {
        Self {
            assets: returns.assets().to_vec(),
            shape: returns.shape(),
            fingerprint: fingerprint(returns),
        }
    }
}

#[derive(Debug, Default)]
pub struct MomentsCache {
    entry: Option<(SeriesKey, AssetMoments)>,
    hits: u64,
    misses: u64,
}

impl MomentsCache {
    pub const fn new() -> Self {
        Self {
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached moments if they were computed from an identical series
    pub fn get(&self, returns: &ReturnSeries) -> Option<&AssetMoments> {
        let key = SeriesKey::of(returns);
        match &self.entry {
            Some((k, moments)) if *k == key => Some(moments),
            _ => None,
        }
    }

    /// Return cached moments for `returns`, estimating them on a miss.
    pub fn get_or_compute(&mut self, returns: &ReturnSeries) -> Result<&AssetMoments> {
        let key = SeriesKey::of(returns);
        let entry = match self.entry.take() {
            Some((k, moments)) if k == key => {
                self.hits += 1;
                (k, moments)
            }
            stale => {
                self.misses += 1;
                match AssetMoments::estimate(returns) {
                    Ok(moments) => (key, moments),
                    Err(e) => {
                        self.entry = stale;
                        return Err(e);
                    }
                }
            }
        };
        let (_, moments) = self.entry.insert(entry);
        Ok(moments)
    }

    /// Drop the cached entry
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// `(hits, misses)` since construction
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
