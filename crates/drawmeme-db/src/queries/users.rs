//! User query functions.

use drawmeme_types::{NewUser, User, UserUpdate};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{unique_violation, DbError, Result};

const COLUMNS: &str =
    "id, solana_address, telegram_id, telegram_username, is_verified, created_at, updated_at";

/// Insert a new user. Fails with `DuplicateIdentity` on a unique collision.
pub fn insert(conn: &Connection, id: &str, user: &NewUser, now: u64) -> Result<User> {
    conn.execute(
        "INSERT INTO users (id, solana_address, telegram_id, telegram_username, is_verified, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 'false', ?5, ?5)",
        rusqlite::params![
            id,
            user.solana_address,
            user.telegram_id,
            user.telegram_username,
            now as i64,
        ],
    )
    .map_err(map_unique)?;

    Ok(User {
        id: id.to_string(),
        solana_address: user.solana_address.clone(),
        telegram_id: user.telegram_id.clone(),
        telegram_username: user.telegram_username.clone(),
        is_verified: false,
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by id.
pub fn get(conn: &Connection, id: &str) -> Result<User> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
        [id],
        from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("user '{id}'")),
        other => DbError::Sqlite(other),
    })
}

/// Look up a user by Solana address.
pub fn find_by_solana_address(conn: &Connection, address: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE solana_address = ?1"),
            [address],
            from_row,
        )
        .optional()?;
    Ok(user)
}

/// Look up a user by Telegram id.
pub fn find_by_telegram_id(conn: &Connection, telegram_id: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM users WHERE telegram_id = ?1"),
            [telegram_id],
            from_row,
        )
        .optional()?;
    Ok(user)
}

/// Merge the present fields of `update` into the user and bump `updated_at`.
pub fn update(conn: &Connection, id: &str, update: &UserUpdate, now: u64) -> Result<User> {
    let changed = conn
        .execute(
            "UPDATE users SET
                telegram_id = COALESCE(?2, telegram_id),
                telegram_username = COALESCE(?3, telegram_username),
                is_verified = COALESCE(?4, is_verified),
                updated_at = ?5
             WHERE id = ?1",
            rusqlite::params![
                id,
                update.telegram_id,
                update.telegram_username,
                update.is_verified.map(|v| v.to_string()),
                now as i64,
            ],
        )
        .map_err(map_unique)?;

    if changed == 0 {
        return Err(DbError::NotFound(format!("user '{id}'")));
    }
    get(conn, id)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        solana_address: row.get(1)?,
        telegram_id: row.get(2)?,
        telegram_username: row.get(3)?,
        is_verified: row.get::<_, String>(4)? == "true",
        created_at: row.get::<_, i64>(5)? as u64,
        updated_at: row.get::<_, i64>(6)? as u64,
    })
}

fn map_unique(e: rusqlite::Error) -> DbError {
    match unique_violation(&e) {
        Some(field) => DbError::DuplicateIdentity(field),
        None => DbError::Sqlite(e),
    }
}
