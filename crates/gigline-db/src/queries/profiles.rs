//! Profile query functions.

use gigline_types::{RoleSet, SignalSnapshot, UserId, UserProfile};
use rusqlite::{Connection, OptionalExtension};

use crate::{not_found, Result};

/// Insert or replace a profile with its grace-period flag.
pub fn upsert(
    conn: &Connection,
    profile: &UserProfile,
    in_grace_period: bool,
    updated_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO profiles (user_id, display_name, roles, signals, in_grace_period, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id) DO UPDATE SET
             display_name = excluded.display_name,
             roles = excluded.roles,
             signals = excluded.signals,
             in_grace_period = excluded.in_grace_period,
             updated_at = excluded.updated_at",
        rusqlite::params![
            profile.user_id.as_str(),
            profile.display_name,
            serde_json::to_string(&profile.roles)?,
            serde_json::to_string(&profile.signals)?,
            in_grace_period,
            updated_at as i64,
        ],
    )?;
    Ok(())
}

/// Get a profile by user id.
pub fn get(conn: &Connection, user_id: &UserId) -> Result<UserProfile> {
    let row = conn
        .query_row(
            "SELECT display_name, roles, signals FROM profiles WHERE user_id = ?1",
            [user_id.as_str()],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .map_err(not_found(|| format!("profile {user_id}")))?;

    let (display_name, roles, signals) = row;
    Ok(UserProfile {
        user_id: user_id.clone(),
        display_name,
        roles: serde_json::from_str::<RoleSet>(&roles)?,
        signals: serde_json::from_str::<SignalSnapshot>(&signals)?,
    })
}

/// Grace-period flag for a user. Unknown users are not in grace.
pub fn in_grace_period(conn: &Connection, user_id: &UserId) -> Result<bool> {
    let flag = conn
        .query_row(
            "SELECT in_grace_period FROM profiles WHERE user_id = ?1",
            [user_id.as_str()],
            |row| row.get::<_, bool>(0),
        )
        .optional()?;
    Ok(flag.unwrap_or(false))
}
