//! Subtree statistics for status displays.

use crate::collection::{Collection, NodeId};

/// Counts for one subtree. `nodes` includes the subtree root itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeStats {
    pub nodes: usize,
    pub groups: usize,
    pub pictures: usize,
}

impl Collection {
    /// Counts the nodes below (and including) `id`.
    pub fn subtree_stats(&self, id: NodeId) -> SubtreeStats {
        let mut stats = SubtreeStats::default();
        for node in self.subtree(id) {
            stats.nodes += 1;
            if self.payload(node).is_group() {
                stats.groups += 1;
            } else {
                stats.pictures += 1;
            }
        }
        stats
    }
}
