//! Duplicate resolution: candidate edges → components → drop sets.

use std::collections::{BTreeSet, HashMap};

use corpus::DocumentId;
use lsh::EdgeSet;
use serde::{Deserialize, Serialize};

use crate::union_find::UnionFind;

/// One resolved duplicate group: the surviving representative plus the
/// members marked for removal. Ids are the rendered `{file}-{offset}` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateCluster {
    pub representative: String,
    pub duplicates: Vec<String>,
}

/// The final artifact of a detection run: which records to drop, grouped by
/// source file for cheap lookup during filtering, plus full cluster
/// membership for reporting.
///
/// Serializable so it can be recorded alongside the filtered output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateIndex {
    clusters: Vec<DuplicateCluster>,
    drops: HashMap<String, BTreeSet<u64>>,
}

impl DuplicateIndex {
    /// Should the record at `(source_file, record_offset)` be removed?
    ///
    /// A file with no entry has no duplicates — that is the normal case,
    /// not an error.
    pub fn should_drop(&self, source_file: &str, record_offset: u64) -> bool {
        self.drops
            .get(source_file)
            .is_some_and(|offsets| offsets.contains(&record_offset))
    }

    /// Resolved clusters, sorted by representative id.
    pub fn clusters(&self) -> &[DuplicateCluster] {
        &self.clusters
    }

    /// Number of duplicate groups (components of size > 1).
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Total number of records marked for removal.
    pub fn dropped_documents(&self) -> usize {
        self.drops.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Resolve the deduplicated edge set into a [`DuplicateIndex`].
///
/// Nodes are implied by edges only — a document with no candidate edge is
/// never a duplicate and never enters the graph. Within each component the
/// member with the lexicographically smallest rendered id survives; every
/// other member is marked for removal. The outcome is independent of edge
/// iteration order: connectivity is order-free by definition and the
/// tie-break is applied once, globally, after all edges are in.
pub fn resolve(edges: &EdgeSet) -> DuplicateIndex {
    // Intern every endpoint into a dense index space.
    let mut docs: Vec<&DocumentId> = Vec::new();
    let mut index_of: HashMap<&DocumentId, usize> = HashMap::new();
    for edge in edges.iter() {
        for doc in [edge.a(), edge.b()] {
            index_of.entry(doc).or_insert_with(|| {
                docs.push(doc);
                docs.len() - 1
            });
        }
    }

    let mut uf = UnionFind::new(docs.len());
    for edge in edges.iter() {
        uf.union(index_of[edge.a()], index_of[edge.b()]);
    }

    let mut clusters = Vec::new();
    let mut drops: HashMap<String, BTreeSet<u64>> = HashMap::new();
    for component in uf.components() {
        if component.len() < 2 {
            // Single-node components cannot occur (nodes are implied by
            // edges), but the guard keeps the invariant local.
            continue;
        }
        let mut members: Vec<&DocumentId> = component.into_iter().map(|i| docs[i]).collect();
        members.sort();

        let representative = members[0];
        let mut duplicates = Vec::with_capacity(members.len() - 1);
        for dup in &members[1..] {
            drops
                .entry(dup.source_file().to_string())
                .or_default()
                .insert(dup.record_offset());
            duplicates.push(dup.as_str().to_string());
        }
        clusters.push(DuplicateCluster {
            representative: representative.as_str().to_string(),
            duplicates,
        });
    }
    clusters.sort_by(|a, b| a.representative.cmp(&b.representative));

    DuplicateIndex { clusters, drops }
}
