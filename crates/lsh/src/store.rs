//! Per-band occupancy store.

use std::collections::HashMap;

use corpus::DocumentId;
use signature::BandKey;
use thiserror::Error;

use crate::edge::CandidateEdge;

/// First-seen-wins map from band key to the document that first occupied it.
///
/// Keeping only the first occupant (not a bucket list) bounds memory to the
/// number of distinct keys. A three-way collision inside one band only
/// yields edges to the first occupant; the missing pair is recovered
/// transitively when the edges are united into components, with the other
/// bands providing further chances.
///
/// Each store is exclusively owned by one consumer worker; there is no
/// shared mutation across bands.
#[derive(Debug, Default)]
pub struct BandStore {
    occupants: HashMap<BandKey, DocumentId>,
    max_keys: Option<usize>,
}

impl BandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a capacity bound; exceeding it aborts the observation with
    /// [`BandStoreError::CapacityExceeded`] instead of growing without
    /// limit.
    pub fn with_capacity_limit(max_keys: Option<usize>) -> Self {
        Self {
            occupants: HashMap::new(),
            max_keys,
        }
    }

    /// Record `doc` under `key`.
    ///
    /// First observation of a key stores the document and emits nothing.
    /// A later observation by a *different* document emits a candidate edge
    /// against the retained occupant. Re-observation by the occupant itself
    /// emits nothing — no self-edges, even if a document is processed twice.
    pub fn observe(
        &mut self,
        doc: &DocumentId,
        key: BandKey,
    ) -> Result<Option<CandidateEdge>, BandStoreError> {
        if let Some(occupant) = self.occupants.get(&key) {
            return Ok(CandidateEdge::new(occupant.clone(), doc.clone()));
        }
        if let Some(max) = self.max_keys {
            if self.occupants.len() >= max {
                return Err(BandStoreError::CapacityExceeded { max });
            }
        }
        self.occupants.insert(key, doc.clone());
        Ok(None)
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

/// Band store faults. `observe` is a pure in-memory operation; the only
/// failure is the configured capacity bound.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BandStoreError {
    #[error("band store capacity exceeded: more than {max} distinct band keys")]
    CapacityExceeded { max: usize },
}
