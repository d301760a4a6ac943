//! Gig and booking history query functions.
//!
//! History rows are only ever inserted. [`update`] writes the gig row under a
//! revision guard and appends the entries the caller added since its read.

use gigline_types::{
    ActionBy, Availability, BookingHistoryEntry, Gig, GigId, GigStatus, UserId,
};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{DbError, Result};

const GIG_COLUMNS: &str = "gig_id, client_id, invited_musician_id, original_musician_id, status,
                           musician_availability, deputy_suggested_id, revision, created_at";

/// A raw gig row, without history.
#[derive(Debug)]
pub struct GigRow {
    pub gig_id: String,
    pub client_id: String,
    pub invited_musician_id: String,
    pub original_musician_id: Option<String>,
    pub status: String,
    pub musician_availability: String,
    pub deputy_suggested_id: Option<String>,
    pub revision: u64,
    pub created_at: u64,
}

impl GigRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            gig_id: row.get(0)?,
            client_id: row.get(1)?,
            invited_musician_id: row.get(2)?,
            original_musician_id: row.get(3)?,
            status: row.get(4)?,
            musician_availability: row.get(5)?,
            deputy_suggested_id: row.get(6)?,
            revision: row.get::<_, i64>(7)? as u64,
            created_at: row.get::<_, i64>(8)? as u64,
        })
    }

    fn into_gig(self, booking_history: Vec<BookingHistoryEntry>) -> Result<Gig> {
        Ok(Gig {
            id: GigId(self.gig_id),
            client_id: UserId(self.client_id),
            invited_musician_id: UserId(self.invited_musician_id),
            original_musician_id: self.original_musician_id.map(UserId),
            status: parse_status(&self.status)?,
            musician_availability: Availability::parse(&self.musician_availability).ok_or_else(
                || DbError::Serialization(format!("unknown availability '{}'", self.musician_availability)),
            )?,
            deputy_suggested_id: self.deputy_suggested_id.map(UserId),
            booking_history,
            revision: self.revision,
            created_at: self.created_at,
        })
    }
}

/// A raw booking history row.
#[derive(Debug)]
pub struct HistoryRow {
    pub status: String,
    pub musician_id: String,
    pub musician_name: Option<String>,
    pub original_musician_id: Option<String>,
    pub action_by: String,
    pub actor_id: Option<String>,
    pub notes: Option<String>,
    pub timestamp: u64,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            status: row.get(0)?,
            musician_id: row.get(1)?,
            musician_name: row.get(2)?,
            original_musician_id: row.get(3)?,
            action_by: row.get(4)?,
            actor_id: row.get(5)?,
            notes: row.get(6)?,
            timestamp: row.get::<_, i64>(7)? as u64,
        })
    }

    fn into_entry(self) -> Result<BookingHistoryEntry> {
        Ok(BookingHistoryEntry {
            status: parse_status(&self.status)?,
            musician_id: UserId(self.musician_id),
            musician_name: self.musician_name,
            original_musician_id: self.original_musician_id.map(UserId),
            action_by: ActionBy::parse(&self.action_by).ok_or_else(|| {
                DbError::Serialization(format!("unknown actor kind '{}'", self.action_by))
            })?,
            actor_id: self.actor_id.map(UserId),
            notes: self.notes,
            timestamp: self.timestamp,
        })
    }
}

fn parse_status(value: &str) -> Result<GigStatus> {
    GigStatus::parse(value)
        .ok_or_else(|| DbError::Serialization(format!("unknown gig status '{value}'")))
}

fn append_history(
    conn: &Connection,
    gig_id: &GigId,
    first_seq: usize,
    entries: &[BookingHistoryEntry],
) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO booking_history
         (gig_id, seq, status, musician_id, musician_name, original_musician_id,
          action_by, actor_id, notes, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for (offset, entry) in entries.iter().enumerate() {
        stmt.execute(rusqlite::params![
            gig_id.as_str(),
            (first_seq + offset) as i64,
            entry.status.as_str(),
            entry.musician_id.as_str(),
            entry.musician_name,
            entry.original_musician_id.as_ref().map(UserId::as_str),
            entry.action_by.as_str(),
            entry.actor_id.as_ref().map(UserId::as_str),
            entry.notes,
            entry.timestamp as i64,
        ])?;
    }
    Ok(())
}

fn history_len(conn: &Connection, gig_id: &GigId) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM booking_history WHERE gig_id = ?1",
        [gig_id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Full booking history of a gig, oldest first.
pub fn history(conn: &Connection, gig_id: &GigId) -> Result<Vec<BookingHistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT status, musician_id, musician_name, original_musician_id,
                action_by, actor_id, notes, timestamp
         FROM booking_history
         WHERE gig_id = ?1
         ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([gig_id.as_str()], HistoryRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(HistoryRow::into_entry).collect()
}

/// Insert a new gig and any history it already carries.
pub fn insert(conn: &Connection, gig: &Gig) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO gigs
         (gig_id, client_id, invited_musician_id, original_musician_id, status,
          musician_availability, deputy_suggested_id, revision, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            gig.id.as_str(),
            gig.client_id.as_str(),
            gig.invited_musician_id.as_str(),
            gig.original_musician_id.as_ref().map(UserId::as_str),
            gig.status.as_str(),
            gig.musician_availability.as_str(),
            gig.deputy_suggested_id.as_ref().map(UserId::as_str),
            gig.revision as i64,
            gig.created_at as i64,
        ],
    )?;
    if inserted == 0 {
        return Err(DbError::Conflict(format!("gig {} already exists", gig.id)));
    }
    append_history(&tx, &gig.id, 0, &gig.booking_history)?;
    tx.commit()?;
    Ok(())
}

/// Get a gig with its full history, if present.
pub fn get(conn: &Connection, gig_id: &GigId) -> Result<Option<Gig>> {
    let row = conn
        .query_row(
            &format!("SELECT {GIG_COLUMNS} FROM gigs WHERE gig_id = ?1"),
            [gig_id.as_str()],
            GigRow::from_row,
        )
        .optional()?;
    match row {
        Some(row) => Ok(Some(row.into_gig(history(conn, gig_id)?)?)),
        None => Ok(None),
    }
}

/// Write `gig` if the stored revision is `expected_revision`, appending the
/// history entries beyond those already stored.
pub fn update(conn: &Connection, gig: &Gig, expected_revision: u64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE gigs
         SET invited_musician_id = ?1, original_musician_id = ?2, status = ?3,
             musician_availability = ?4, deputy_suggested_id = ?5, revision = ?6
         WHERE gig_id = ?7 AND revision = ?8",
        rusqlite::params![
            gig.invited_musician_id.as_str(),
            gig.original_musician_id.as_ref().map(UserId::as_str),
            gig.status.as_str(),
            gig.musician_availability.as_str(),
            gig.deputy_suggested_id.as_ref().map(UserId::as_str),
            gig.revision as i64,
            gig.id.as_str(),
            expected_revision as i64,
        ],
    )?;
    if updated == 0 {
        let exists = tx
            .query_row("SELECT 1 FROM gigs WHERE gig_id = ?1", [gig.id.as_str()], |_| Ok(()))
            .optional()?
            .is_some();
        return Err(if exists {
            DbError::Conflict(format!(
                "gig {} is no longer at revision {expected_revision}",
                gig.id
            ))
        } else {
            DbError::NotFound(format!("gig {}", gig.id))
        });
    }

    let stored = history_len(&tx, &gig.id)?;
    let Some(new_entries) = gig.booking_history.get(stored..) else {
        return Err(DbError::Conflict(format!(
            "gig {} carries fewer history entries than stored",
            gig.id
        )));
    };
    append_history(&tx, &gig.id, stored, new_entries)?;
    tx.commit()?;
    Ok(())
}

/// Gigs where the user is client or invited musician, newest first.
pub fn list_for_user(conn: &Connection, user_id: &UserId) -> Result<Vec<Gig>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GIG_COLUMNS} FROM gigs
         WHERE client_id = ?1 OR invited_musician_id = ?1
         ORDER BY created_at DESC, gig_id"
    ))?;
    let rows = stmt
        .query_map([user_id.as_str()], GigRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|row| {
            let entries = history(conn, &GigId(row.gig_id.clone()))?;
            row.into_gig(entries)
        })
        .collect()
}
