//! SQL schema definitions.

/// Complete schema for the v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Profiles (written by the profile/trial collaborators)
-- ============================================================

CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    display_name TEXT,
    roles TEXT NOT NULL,
    signals TEXT NOT NULL,
    in_grace_period INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER NOT NULL
);

-- ============================================================
-- Deputy relationships
-- ============================================================

CREATE TABLE IF NOT EXISTS deputy_relationships (
    principal_id TEXT NOT NULL,
    deputy_id TEXT NOT NULL,
    for_skill TEXT NOT NULL,
    gig_type TEXT,
    note TEXT,
    status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')),
    can_be_booked INTEGER NOT NULL DEFAULT 0,
    date_added INTEGER NOT NULL,
    responded_at INTEGER,
    PRIMARY KEY (principal_id, deputy_id),
    CHECK (principal_id <> deputy_id)
);

CREATE INDEX IF NOT EXISTS idx_deputy_relationships_deputy
    ON deputy_relationships (deputy_id);

-- ============================================================
-- Gigs and booking history
-- ============================================================

CREATE TABLE IF NOT EXISTS gigs (
    gig_id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL,
    invited_musician_id TEXT NOT NULL,
    original_musician_id TEXT,
    status TEXT NOT NULL CHECK (status IN
        ('pending', 'accepted', 'declined', 'deputy-suggested', 'cancelled')),
    musician_availability TEXT NOT NULL DEFAULT 'undefined' CHECK (musician_availability IN
        ('available', 'notavailable', 'undefined')),
    deputy_suggested_id TEXT,
    revision INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_gigs_client ON gigs (client_id);
CREATE INDEX IF NOT EXISTS idx_gigs_musician ON gigs (invited_musician_id);

CREATE TABLE IF NOT EXISTS booking_history (
    gig_id TEXT NOT NULL REFERENCES gigs(gig_id),
    seq INTEGER NOT NULL,
    status TEXT NOT NULL,
    musician_id TEXT NOT NULL,
    musician_name TEXT,
    original_musician_id TEXT,
    action_by TEXT NOT NULL CHECK (action_by IN ('client', 'musician', 'system')),
    actor_id TEXT,
    notes TEXT,
    timestamp INTEGER NOT NULL,
    PRIMARY KEY (gig_id, seq)
);

CREATE TRIGGER IF NOT EXISTS booking_history_no_update
BEFORE UPDATE ON booking_history
BEGIN
    SELECT RAISE(ABORT, 'booking history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS booking_history_no_delete
BEFORE DELETE ON booking_history
BEGIN
    SELECT RAISE(ABORT, 'booking history is append-only');
END;
"#;
