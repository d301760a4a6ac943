//! Integration test: what the SQLite layer guarantees on disk.

use gigline_db::SqliteStore;
use gigline_gig::{GigService, GigStore, Transition, TransitionRequest};
use gigline_integration_tests::{temp_db_path, Harness, TEST_TIMESTAMP};
use gigline_trust::GracePeriodProvider;
use gigline_types::{ErrorKind, GigId, GigStatus, Role, StoreError};

fn cleanup(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[test]
fn booking_history_rows_are_immutable() {
    let path = temp_db_path();
    let gig_id = GigId::new("gig-disk");
    {
        let h = Harness::with_store(SqliteStore::open(&path).expect("open"));
        h.add_user("client", &[Role::Booker], 40);
        h.add_user("musician", &[Role::Musician], 50);
        let trust = h.trust();
        let service = GigService::new(&h.store, &h.store, &trust);
        service
            .create_gig(gig_id.clone(), &"client".into(), &"musician".into(), TEST_TIMESTAMP)
            .expect("create");
        service
            .transition(
                &gig_id,
                &TransitionRequest {
                    transition: Transition::Accept,
                    actor: "musician".into(),
                    expected_status: GigStatus::Pending,
                    notes: Some("see you there".into()),
                    timestamp: TEST_TIMESTAMP + 1,
                },
            )
            .expect("accept");
    }

    let conn = gigline_db::open(&path).expect("raw open");
    let updated = conn.execute(
        "UPDATE booking_history SET status = 'declined' WHERE gig_id = ?1",
        rusqlite::params![gig_id.0],
    );
    assert!(updated.is_err());
    let deleted = conn.execute(
        "DELETE FROM booking_history WHERE gig_id = ?1",
        rusqlite::params![gig_id.0],
    );
    assert!(deleted.is_err());
    drop(conn);

    let store = SqliteStore::open(&path).expect("reopen");
    let gig = GigStore::get(&store, &gig_id).expect("get").expect("exists");
    assert_eq!(gig.status, GigStatus::Accepted);
    assert_eq!(gig.booking_history.len(), 1);
    assert_eq!(gig.booking_history[0].notes.as_deref(), Some("see you there"));
    drop(store);

    cleanup(&path);
}

#[test]
fn stale_revision_is_rejected() {
    let h = Harness::new();
    h.add_user("client", &[Role::Client], 40);
    h.add_user("musician", &[Role::Musician], 50);
    let trust = h.trust();
    let service = GigService::new(&h.store, &h.store, &trust);
    let gig = service
        .create_gig(GigId::new("gig-rev"), &"client".into(), &"musician".into(), TEST_TIMESTAMP)
        .expect("create");

    let mut first = gig.clone();
    first.status = GigStatus::Cancelled;
    first.revision = 1;
    h.store.update(&first, 0).expect("first writer");

    let mut second = gig;
    second.status = GigStatus::Declined;
    second.revision = 1;
    let err = h.store.update(&second, 0).expect_err("second writer");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn grace_period_flag_round_trips() {
    let h = Harness::new();
    h.add_user("known", &[Role::Musician], 20);
    assert!(!h.store.is_in_grace_period(&"known".into()).expect("known"));
    assert!(!h.store.is_in_grace_period(&"stranger".into()).expect("unknown"));
}
