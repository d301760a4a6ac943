//! Persistence seam for gigs.
//!
//! Writes are compare-and-swap on [`Gig::revision`]: an update lands only if
//! the stored revision is still the one the caller read, so two concurrent
//! transitions on one gig can never both succeed.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gigline_types::{Gig, GigId, StoreError, UserId};

pub trait GigStore {
    fn get(&self, gig_id: &GigId) -> Result<Option<Gig>, StoreError>;

    /// Store a new gig. Fails with [`StoreError::Conflict`] if the id exists.
    fn insert(&self, gig: &Gig) -> Result<(), StoreError>;

    /// Replace a gig whose stored revision equals `expected_revision`.
    ///
    /// History is append-only: implementations keep stored entries and add
    /// the ones `gig` carries beyond them.
    fn update(&self, gig: &Gig, expected_revision: u64) -> Result<(), StoreError>;

    /// Gigs where `user_id` is the client or the invited musician.
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Gig>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryGigStore {
    gigs: Mutex<BTreeMap<GigId, Gig>>,
}

impl InMemoryGigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<GigId, Gig>> {
        self.gigs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GigStore for InMemoryGigStore {
    fn get(&self, gig_id: &GigId) -> Result<Option<Gig>, StoreError> {
        Ok(self.lock().get(gig_id).cloned())
    }

    fn insert(&self, gig: &Gig) -> Result<(), StoreError> {
        let mut gigs = self.lock();
        if gigs.contains_key(&gig.id) {
            return Err(StoreError::Conflict(format!("gig {} already exists", gig.id)));
        }
        gigs.insert(gig.id.clone(), gig.clone());
        Ok(())
    }

    fn update(&self, gig: &Gig, expected_revision: u64) -> Result<(), StoreError> {
        let mut gigs = self.lock();
        let stored = gigs
            .get_mut(&gig.id)
            .ok_or_else(|| StoreError::NotFound(format!("gig {}", gig.id)))?;
        if stored.revision != expected_revision {
            return Err(StoreError::Conflict(format!(
                "gig {} is at revision {}, expected {expected_revision}",
                gig.id, stored.revision
            )));
        }
        if !gig.booking_history.starts_with(&stored.booking_history) {
            return Err(StoreError::Backend(format!(
                "gig {} would rewrite booking history",
                gig.id
            )));
        }
        *stored = gig.clone();
        Ok(())
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Gig>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|g| &g.client_id == user_id || &g.invited_musician_id == user_id)
            .cloned()
            .collect())
    }
}
