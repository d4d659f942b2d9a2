//! # Neardup LSH layer
//!
//! Locality-sensitive candidate generation: per-band occupancy stores that
//! turn band-key collisions into [`CandidateEdge`]s, and the [`EdgeSet`]
//! that unions them across bands.
//!
//! ## Design notes
//!
//! - A [`BandStore`] keeps only the first occupant per key. Whether a true
//!   candidate pair is found does not depend on arrival order — every later
//!   arrival with a matching key still triggers an edge — only *which*
//!   document sits in the occupant slot does, and representative selection
//!   happens later, order-independently, in the cluster layer.
//! - Each store is owned by exactly one worker; the edge set is owned by
//!   exactly one aggregator. Nothing here locks.

mod aggregate;
mod edge;
mod store;

pub use crate::aggregate::EdgeSet;
pub use crate::edge::CandidateEdge;
pub use crate::store::{BandStore, BandStoreError};
