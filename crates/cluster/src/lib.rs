//! # Neardup cluster layer
//!
//! Resolves the candidate edge set into duplicate groups: an undirected
//! graph over document ids (nodes implied by edges), connected components
//! via union-find, one surviving representative per component, and the
//! per-file drop sets the corpus filter consumes.
//!
//! The representative contract: the lexicographically smallest rendered
//! document id in each component survives. The policy is applied once,
//! after all edges are collected — never during streaming — so the outcome
//! cannot depend on worker scheduling or arrival order.

mod resolve;
mod union_find;

pub use crate::resolve::{resolve, DuplicateCluster, DuplicateIndex};
pub use crate::union_find::UnionFind;
