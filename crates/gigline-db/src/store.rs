//! [`SqliteStore`]: one connection behind a mutex, implementing every
//! persistence seam the core crates define.
//!
//! The mutex serializes all access, which gives the per-pair and per-gig
//! write ordering the seams require. Status and revision guards live in the
//! SQL itself.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gigline_deputy::{DeputyGraph, DeputyStore, Insertion};
use gigline_gig::GigStore;
use gigline_trust::{GracePeriodProvider, ProfileProvider};
use gigline_types::{
    DeputyRelationship, DeputyStatus, Gig, GigId, StoreError, UserId, UserProfile,
};
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::queries::{deputies, gigs, profiles};
use crate::{DbError, Result};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_connection(crate::open(path)?))
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self::from_connection(crate::open_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a profile pushed by the profile/trial collaborators.
    pub fn sync_profile(&self, profile: &UserProfile, in_grace_period: bool, now: u64) -> Result<()> {
        profiles::upsert(&self.conn(), profile, in_grace_period, now)
    }
}

impl ProfileProvider for SqliteStore {
    fn profile(&self, user_id: &UserId) -> std::result::Result<Option<UserProfile>, StoreError> {
        match profiles::get(&self.conn(), user_id) {
            Ok(profile) => Ok(Some(profile)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl GracePeriodProvider for SqliteStore {
    fn is_in_grace_period(&self, user_id: &UserId) -> std::result::Result<bool, StoreError> {
        Ok(profiles::in_grace_period(&self.conn(), user_id)?)
    }
}

impl DeputyStore for SqliteStore {
    fn get(
        &self,
        principal_id: &UserId,
        deputy_id: &UserId,
    ) -> std::result::Result<Option<DeputyRelationship>, StoreError> {
        Ok(deputies::get(&self.conn(), principal_id, deputy_id)?)
    }

    fn insert_if_acyclic(
        &self,
        relationship: DeputyRelationship,
    ) -> std::result::Result<Insertion, StoreError> {
        Ok(insert_if_acyclic(&self.conn(), relationship)?)
    }

    fn replace(
        &self,
        relationship: &DeputyRelationship,
        expected: DeputyStatus,
    ) -> std::result::Result<(), StoreError> {
        Ok(deputies::replace(&self.conn(), relationship, expected)?)
    }

    fn delete(&self, principal_id: &UserId, deputy_id: &UserId) -> std::result::Result<bool, StoreError> {
        Ok(deputies::delete(&self.conn(), principal_id, deputy_id)?)
    }

    fn list_by_principal(
        &self,
        principal_id: &UserId,
    ) -> std::result::Result<Vec<DeputyRelationship>, StoreError> {
        Ok(deputies::list_by_principal(&self.conn(), principal_id)?)
    }

    fn list_by_deputy(&self, deputy_id: &UserId) -> std::result::Result<Vec<DeputyRelationship>, StoreError> {
        Ok(deputies::list_by_deputy(&self.conn(), deputy_id)?)
    }
}

/// Check and write inside one IMMEDIATE transaction, so a second process on
/// the same file cannot slip an edge in between.
fn insert_if_acyclic(conn: &Connection, relationship: DeputyRelationship) -> Result<Insertion> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if let Some(existing) = deputies::get(&tx, &relationship.principal_id, &relationship.deputy_id)? {
        return Ok(Insertion::Existing(existing));
    }
    let graph = DeputyGraph::from_relationships(&deputies::list_active(&tx)?);
    if graph.would_create_cycle(&relationship.principal_id, &relationship.deputy_id) {
        return Ok(Insertion::WouldCycle);
    }
    if !deputies::insert_if_absent(&tx, &relationship)? {
        return Err(DbError::Conflict(format!(
            "deputy relationship {} -> {} appeared mid-transaction",
            relationship.principal_id, relationship.deputy_id
        )));
    }
    tx.commit()?;
    Ok(Insertion::Created(relationship))
}

impl GigStore for SqliteStore {
    fn get(&self, gig_id: &GigId) -> std::result::Result<Option<Gig>, StoreError> {
        Ok(gigs::get(&self.conn(), gig_id)?)
    }

    fn insert(&self, gig: &Gig) -> std::result::Result<(), StoreError> {
        Ok(gigs::insert(&self.conn(), gig)?)
    }

    fn update(&self, gig: &Gig, expected_revision: u64) -> std::result::Result<(), StoreError> {
        Ok(gigs::update(&self.conn(), gig, expected_revision)?)
    }

    fn list_for_user(&self, user_id: &UserId) -> std::result::Result<Vec<Gig>, StoreError> {
        Ok(gigs::list_for_user(&self.conn(), user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigline_types::{ErrorKind, Role, RoleSet, SignalSnapshot};

    #[test]
    fn test_profile_provider() {
        let store = SqliteStore::open_memory().expect("open");
        assert_eq!(store.profile(&"u1".into()).expect("lookup"), None);

        let profile = UserProfile {
            user_id: "u1".into(),
            display_name: None,
            roles: RoleSet::single(Role::Booker),
            signals: SignalSnapshot::default(),
        };
        store.sync_profile(&profile, true, 5).expect("sync");
        assert_eq!(store.profile(&"u1".into()).expect("lookup"), Some(profile));
        assert!(store.is_in_grace_period(&"u1".into()).expect("grace"));
    }

    #[test]
    fn test_deputy_store_semantics() {
        let store = SqliteStore::open_memory().expect("open");
        let rel = DeputyRelationship::pending("p".into(), "d".into(), "sax", 1);

        let first = store.insert_if_acyclic(rel.clone()).expect("insert");
        assert_eq!(first, Insertion::Created(rel.clone()));
        let mut other = rel.clone();
        other.for_skill = "flute".into();
        let second = store.insert_if_acyclic(other).expect("insert again");
        assert_eq!(second, Insertion::Existing(rel.clone()));

        let reverse = DeputyRelationship::pending("d".into(), "p".into(), "sax", 1);
        let outcome = store.insert_if_acyclic(reverse).expect("reverse");
        assert_eq!(outcome, Insertion::WouldCycle);
        assert_eq!(DeputyStore::get(&store, &"d".into(), &"p".into()).expect("get"), None);

        let mut accepted = rel;
        accepted.status = DeputyStatus::Accepted;
        store.replace(&accepted, DeputyStatus::Pending).expect("replace");
        let err = store
            .replace(&accepted, DeputyStatus::Pending)
            .expect_err("stale");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_gig_store_conflict_kind() {
        let store = SqliteStore::open_memory().expect("open");
        let gig = Gig::new("g".into(), "c".into(), "m".into(), 1);
        GigStore::insert(&store, &gig).expect("insert");
        let mut next = gig.clone();
        next.revision = 1;
        GigStore::update(&store, &next, 0).expect("update");
        let err = GigStore::update(&store, &next, 0).expect_err("stale");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(GigStore::get(&store, &"g".into()).expect("get"), Some(next));
    }
}
