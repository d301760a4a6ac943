//! The deputy relationship graph.
//!
//! Relationships are directed edges `principal → deputy`, held as adjacency
//! by id. Deputies may have deputies of their own, but no chain may lead back
//! to where it started. Rejected relationships are not edges.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use gigline_types::{DeputyRelationship, DeputyStatus, UserId};

/// Adjacency view over a set of relationships.
#[derive(Clone, Debug, Default)]
pub struct DeputyGraph {
    edges: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl DeputyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_relationships<'a>(
        relationships: impl IntoIterator<Item = &'a DeputyRelationship>,
    ) -> Self {
        let mut graph = Self::new();
        for rel in relationships {
            if rel.status != DeputyStatus::Rejected {
                graph.add_edge(rel.principal_id.clone(), rel.deputy_id.clone());
            }
        }
        graph
    }

    pub fn add_edge(&mut self, principal_id: UserId, deputy_id: UserId) {
        self.edges.entry(principal_id).or_default().insert(deputy_id);
    }

    pub fn deputies_of(&self, principal_id: &UserId) -> impl Iterator<Item = &UserId> {
        self.edges.get(principal_id).into_iter().flatten()
    }

    /// Whether a chain of edges leads from `from` to `to`.
    pub fn reaches(&self, from: &UserId, to: &UserId) -> bool {
        let mut queue = VecDeque::from([from]);
        let mut seen = BTreeSet::new();
        while let Some(node) = queue.pop_front() {
            if node == to {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            queue.extend(self.deputies_of(node));
        }
        false
    }

    /// Whether adding `principal → deputy` would close a cycle.
    pub fn would_create_cycle(&self, principal_id: &UserId, deputy_id: &UserId) -> bool {
        principal_id == deputy_id || self.reaches(deputy_id, principal_id)
    }
}
