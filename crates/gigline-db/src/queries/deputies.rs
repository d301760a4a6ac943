//! Deputy relationship query functions.

use gigline_types::{DeputyRelationship, DeputyStatus, UserId};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{DbError, Result};

const COLUMNS: &str = "principal_id, deputy_id, for_skill, gig_type, note, status,
                       can_be_booked, date_added, responded_at";

/// A raw relationship row.
#[derive(Debug)]
pub struct DeputyRow {
    pub principal_id: String,
    pub deputy_id: String,
    pub for_skill: String,
    pub gig_type: Option<String>,
    pub note: Option<String>,
    pub status: String,
    pub can_be_booked: bool,
    pub date_added: u64,
    pub responded_at: Option<u64>,
}

impl DeputyRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            principal_id: row.get(0)?,
            deputy_id: row.get(1)?,
            for_skill: row.get(2)?,
            gig_type: row.get(3)?,
            note: row.get(4)?,
            status: row.get(5)?,
            can_be_booked: row.get(6)?,
            date_added: row.get::<_, i64>(7)? as u64,
            responded_at: row.get::<_, Option<i64>>(8)?.map(|t| t as u64),
        })
    }

    pub fn into_relationship(self) -> Result<DeputyRelationship> {
        let status = DeputyStatus::parse(&self.status).ok_or_else(|| {
            DbError::Serialization(format!("unknown deputy status '{}'", self.status))
        })?;
        Ok(DeputyRelationship {
            principal_id: UserId(self.principal_id),
            deputy_id: UserId(self.deputy_id),
            for_skill: self.for_skill,
            gig_type: self.gig_type,
            note: self.note,
            status,
            can_be_booked: self.can_be_booked,
            date_added: self.date_added,
            responded_at: self.responded_at,
        })
    }
}

/// Insert a relationship unless the pair exists. Returns whether a row was
/// written. Only the primary key conflict is skipped; CHECK failures still
/// surface as errors.
pub fn insert_if_absent(conn: &Connection, rel: &DeputyRelationship) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO deputy_relationships
         (principal_id, deputy_id, for_skill, gig_type, note, status,
          can_be_booked, date_added, responded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (principal_id, deputy_id) DO NOTHING",
        rusqlite::params![
            rel.principal_id.as_str(),
            rel.deputy_id.as_str(),
            rel.for_skill,
            rel.gig_type,
            rel.note,
            rel.status.as_str(),
            rel.can_be_booked,
            rel.date_added as i64,
            rel.responded_at.map(|t| t as i64),
        ],
    )?;
    Ok(inserted == 1)
}

/// Get one relationship, if present.
pub fn get(
    conn: &Connection,
    principal_id: &UserId,
    deputy_id: &UserId,
) -> Result<Option<DeputyRelationship>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM deputy_relationships
             WHERE principal_id = ?1 AND deputy_id = ?2"
        ),
        [principal_id.as_str(), deputy_id.as_str()],
        DeputyRow::from_row,
    )
    .optional()?
    .map(DeputyRow::into_relationship)
    .transpose()
}

/// Overwrite the mutable fields of a relationship whose status is still
/// `expected`.
pub fn replace(conn: &Connection, rel: &DeputyRelationship, expected: DeputyStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE deputy_relationships
         SET for_skill = ?1, gig_type = ?2, note = ?3, status = ?4,
             can_be_booked = ?5, responded_at = ?6
         WHERE principal_id = ?7 AND deputy_id = ?8 AND status = ?9",
        rusqlite::params![
            rel.for_skill,
            rel.gig_type,
            rel.note,
            rel.status.as_str(),
            rel.can_be_booked,
            rel.responded_at.map(|t| t as i64),
            rel.principal_id.as_str(),
            rel.deputy_id.as_str(),
            expected.as_str(),
        ],
    )?;
    if updated == 1 {
        return Ok(());
    }

    let pair = format!("deputy relationship {} -> {}", rel.principal_id, rel.deputy_id);
    match get(conn, &rel.principal_id, &rel.deputy_id)? {
        Some(current) => Err(DbError::Conflict(format!(
            "{pair} is {}, expected {}",
            current.status.as_str(),
            expected.as_str()
        ))),
        None => Err(DbError::NotFound(pair)),
    }
}

/// Delete a relationship. Returns whether a row was removed.
pub fn delete(conn: &Connection, principal_id: &UserId, deputy_id: &UserId) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM deputy_relationships WHERE principal_id = ?1 AND deputy_id = ?2",
        [principal_id.as_str(), deputy_id.as_str()],
    )?;
    Ok(deleted == 1)
}

fn list(conn: &Connection, column: &str, user_id: &UserId) -> Result<Vec<DeputyRelationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM deputy_relationships
         WHERE {column} = ?1
         ORDER BY date_added, principal_id, deputy_id"
    ))?;
    let rows = stmt
        .query_map([user_id.as_str()], DeputyRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(DeputyRow::into_relationship).collect()
}

/// Every relationship that still forms an edge of the deputy graph.
pub fn list_active(conn: &Connection) -> Result<Vec<DeputyRelationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM deputy_relationships WHERE status <> ?1"
    ))?;
    let rows = stmt
        .query_map([DeputyStatus::Rejected.as_str()], DeputyRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(DeputyRow::into_relationship).collect()
}

/// Relationships a principal has created.
pub fn list_by_principal(conn: &Connection, principal_id: &UserId) -> Result<Vec<DeputyRelationship>> {
    list(conn, "principal_id", principal_id)
}

/// Relationships naming a user as deputy.
pub fn list_by_deputy(conn: &Connection, deputy_id: &UserId) -> Result<Vec<DeputyRelationship>> {
    list(conn, "deputy_id", deputy_id)
}
