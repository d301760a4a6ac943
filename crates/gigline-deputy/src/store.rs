//! Persistence seam for deputy relationships.
//!
//! Implementations must serialize writes per `(principal, deputy)` pair:
//! [`DeputyStore::insert_if_acyclic`] checks and writes in one step, and
//! [`DeputyStore::replace`] only lands if the stored status is still the one
//! the caller read.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gigline_types::{DeputyRelationship, DeputyStatus, StoreError, UserId};

use crate::graph::DeputyGraph;

/// What [`DeputyStore::insert_if_acyclic`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The relationship was written.
    Created(DeputyRelationship),
    /// The pair already had a relationship; nothing was written.
    Existing(DeputyRelationship),
    /// The new edge would have closed a deputy chain; nothing was written.
    WouldCycle,
}

pub trait DeputyStore {
    fn get(
        &self,
        principal_id: &UserId,
        deputy_id: &UserId,
    ) -> Result<Option<DeputyRelationship>, StoreError>;

    /// Store `relationship` unless its pair already exists or the edge would
    /// close a cycle among non-rejected relationships.
    ///
    /// The lookup, the reachability walk and the write must happen as one
    /// atomic step, so two crossing requests cannot both land.
    fn insert_if_acyclic(&self, relationship: DeputyRelationship) -> Result<Insertion, StoreError>;

    /// Overwrite a relationship whose stored status equals `expected`.
    ///
    /// Fails with [`StoreError::Conflict`] on a status mismatch and
    /// [`StoreError::NotFound`] if the pair is gone.
    fn replace(
        &self,
        relationship: &DeputyRelationship,
        expected: DeputyStatus,
    ) -> Result<(), StoreError>;

    /// Returns whether a relationship was deleted.
    fn delete(&self, principal_id: &UserId, deputy_id: &UserId) -> Result<bool, StoreError>;

    fn list_by_principal(&self, principal_id: &UserId)
        -> Result<Vec<DeputyRelationship>, StoreError>;

    fn list_by_deputy(&self, deputy_id: &UserId) -> Result<Vec<DeputyRelationship>, StoreError>;
}

/// A process-local store. The mutex serializes every write.
#[derive(Default)]
pub struct InMemoryDeputyStore {
    relationships: Mutex<BTreeMap<(UserId, UserId), DeputyRelationship>>,
}

impl InMemoryDeputyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<(UserId, UserId), DeputyRelationship>> {
        self.relationships
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn pair_key(principal_id: &UserId, deputy_id: &UserId) -> (UserId, UserId) {
    (principal_id.clone(), deputy_id.clone())
}

impl DeputyStore for InMemoryDeputyStore {
    fn get(
        &self,
        principal_id: &UserId,
        deputy_id: &UserId,
    ) -> Result<Option<DeputyRelationship>, StoreError> {
        Ok(self.lock().get(&pair_key(principal_id, deputy_id)).cloned())
    }

    fn insert_if_acyclic(&self, relationship: DeputyRelationship) -> Result<Insertion, StoreError> {
        let mut map = self.lock();
        let key = pair_key(&relationship.principal_id, &relationship.deputy_id);
        if let Some(existing) = map.get(&key) {
            return Ok(Insertion::Existing(existing.clone()));
        }
        let graph = DeputyGraph::from_relationships(map.values());
        if graph.would_create_cycle(&relationship.principal_id, &relationship.deputy_id) {
            return Ok(Insertion::WouldCycle);
        }
        map.insert(key, relationship.clone());
        Ok(Insertion::Created(relationship))
    }

    fn replace(
        &self,
        relationship: &DeputyRelationship,
        expected: DeputyStatus,
    ) -> Result<(), StoreError> {
        let mut map = self.lock();
        let key = pair_key(&relationship.principal_id, &relationship.deputy_id);
        let stored = map
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound("deputy relationship".into()))?;
        if stored.status != expected {
            return Err(StoreError::Conflict(format!(
                "deputy relationship is {}, expected {}",
                stored.status.as_str(),
                expected.as_str()
            )));
        }
        *stored = relationship.clone();
        Ok(())
    }

    fn delete(&self, principal_id: &UserId, deputy_id: &UserId) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .remove(&pair_key(principal_id, deputy_id))
            .is_some())
    }

    fn list_by_principal(
        &self,
        principal_id: &UserId,
    ) -> Result<Vec<DeputyRelationship>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|r| &r.principal_id == principal_id)
            .cloned()
            .collect())
    }

    fn list_by_deputy(&self, deputy_id: &UserId) -> Result<Vec<DeputyRelationship>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|r| &r.deputy_id == deputy_id)
            .cloned()
            .collect())
    }
}
