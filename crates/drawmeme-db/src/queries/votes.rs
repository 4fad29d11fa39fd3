//! Vote query functions.
//!
//! These only touch the `votes` table. Keeping the token counter in step
//! is the registry's job.

use drawmeme_types::Vote;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{DbError, Result};

/// Insert a vote record.
///
/// The UNIQUE `(token_id, voter_identity)` index turns a repeat into
/// `DuplicateVote`; the foreign key turns an unknown token into
/// `TokenNotFound`.
pub fn insert(
    conn: &Connection,
    id: &str,
    token_id: &str,
    voter_identity: &str,
    now: u64,
) -> Result<Vote> {
    conn.execute(
        "INSERT INTO votes (id, token_id, voter_identity, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, token_id, voter_identity, now as i64],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            DbError::DuplicateVote {
                token_id: token_id.to_string(),
                voter_identity: voter_identity.to_string(),
            }
        }
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            DbError::TokenNotFound(token_id.to_string())
        }
        other => DbError::Sqlite(other),
    })?;

    Ok(Vote {
        id: id.to_string(),
        token_id: token_id.to_string(),
        voter_identity: voter_identity.to_string(),
        timestamp: now,
    })
}

/// True if `voter_identity` already voted for `token_id`.
pub fn exists(conn: &Connection, token_id: &str, voter_identity: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM votes WHERE token_id = ?1 AND voter_identity = ?2",
            [token_id, voter_identity],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// All votes for a token, oldest first.
pub fn list_for_token(conn: &Connection, token_id: &str) -> Result<Vec<Vote>> {
    let mut stmt = conn.prepare(
        "SELECT id, token_id, voter_identity, timestamp
         FROM votes WHERE token_id = ?1 ORDER BY seq",
    )?;

    let rows = stmt
        .query_map([token_id], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Number of vote records for a token.
pub fn count_for_token(conn: &Connection, token_id: &str) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM votes WHERE token_id = ?1",
        [token_id],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Vote> {
    Ok(Vote {
        id: row.get(0)?,
        token_id: row.get(1)?,
        voter_identity: row.get(2)?,
        timestamp: row.get::<_, i64>(3)? as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::tokens;
    use drawmeme_types::NewToken;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        let token = NewToken {
            name: "Doge".to_string(),
            ticker: "DOGE".to_string(),
            image_url: "/uploads/a.png".to_string(),
            pumpfun_link: None,
        };
        tokens::insert(&conn, "t1", &token, 1000).expect("insert token");
        conn
    }

    #[test]
    fn test_insert_and_list() {
        let conn = test_db();
        insert(&conn, "v1", "t1", "1.1.1.1", 2000).expect("vote");
        insert(&conn, "v2", "t1", "2.2.2.2", 3000).expect("vote");

        let votes = list_for_token(&conn, "t1").expect("list");
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].voter_identity, "1.1.1.1");
        assert_eq!(votes[1].timestamp, 3000);
        assert_eq!(count_for_token(&conn, "t1").expect("count"), 2);
        assert!(list_for_token(&conn, "other").expect("list").is_empty());
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let conn = test_db();
        insert(&conn, "v1", "t1", "1.1.1.1", 2000).expect("vote");
        let err = insert(&conn, "v2", "t1", "1.1.1.1", 3000).expect_err("dup");
        assert!(matches!(err, DbError::DuplicateVote { .. }));
        assert_eq!(count_for_token(&conn, "t1").expect("count"), 1);
    }

    #[test]
    fn test_unknown_token_rejected() {
        let conn = test_db();
        let err = insert(&conn, "v1", "ghost", "1.1.1.1", 2000).expect_err("fk");
        assert!(matches!(err, DbError::TokenNotFound(_)));
    }

    #[test]
    fn test_exists() {
        let conn = test_db();
        assert!(!exists(&conn, "t1", "1.1.1.1").expect("exists"));
        insert(&conn, "v1", "t1", "1.1.1.1", 2000).expect("vote");
        assert!(exists(&conn, "t1", "1.1.1.1").expect("exists"));
        assert!(!exists(&conn, "t1", "2.2.2.2").expect("exists"));
    }
}
