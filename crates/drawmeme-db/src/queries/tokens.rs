//! Token query functions.

use drawmeme_types::{NewToken, Token, TokenStats};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{DbError, Result};

// A missing creation time reads as zero so it sorts as the oldest.
const COLUMNS: &str =
    "id, name, ticker, image_url, pumpfun_link, votes, COALESCE(created_at, 0)";

/// Insert a freshly launched token with zero votes.
pub fn insert(conn: &Connection, id: &str, token: &NewToken, now: u64) -> Result<Token> {
    conn.execute(
        "INSERT INTO tokens (id, name, ticker, image_url, pumpfun_link, votes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        rusqlite::params![
            id,
            token.name,
            token.ticker,
            token.image_url,
            token.pumpfun_link,
            now as i64,
        ],
    )?;

    Ok(Token {
        id: id.to_string(),
        name: token.name.clone(),
        ticker: token.ticker.clone(),
        image_url: token.image_url.clone(),
        pumpfun_link: token.pumpfun_link.clone(),
        votes: 0,
        created_at: now,
    })
}

/// Look up a token by id.
pub fn find(conn: &Connection, id: &str) -> Result<Option<Token>> {
    let token = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM tokens WHERE id = ?1"),
            [id],
            from_row,
        )
        .optional()?;
    Ok(token)
}

/// True if a token with this id exists.
pub fn exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM tokens WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// All tokens in launch order.
pub fn list_all(conn: &Connection) -> Result<Vec<Token>> {
    query_list(conn, &format!("SELECT {COLUMNS} FROM tokens ORDER BY seq"), [])
}

/// All tokens by vote count, highest first. Equal counts keep launch order.
pub fn list_by_votes(conn: &Connection) -> Result<Vec<Token>> {
    query_list(
        conn,
        &format!("SELECT {COLUMNS} FROM tokens ORDER BY votes DESC, seq ASC"),
        [],
    )
}

/// The `limit` most recently launched tokens, newest first.
pub fn list_recent(conn: &Connection, limit: usize) -> Result<Vec<Token>> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM tokens
             ORDER BY COALESCE(created_at, 0) DESC, seq ASC
             LIMIT ?1"
        ),
        [i64::try_from(limit).unwrap_or(i64::MAX)],
    )
}

/// Add one vote to the counter. Returns the new count.
pub fn increment_votes(conn: &Connection, id: &str) -> Result<u64> {
    let changed = conn.execute("UPDATE tokens SET votes = votes + 1 WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(DbError::TokenNotFound(id.to_string()));
    }
    let votes: i64 = conn.query_row("SELECT votes FROM tokens WHERE id = ?1", [id], |row| {
        row.get(0)
    })?;
    Ok(votes as u64)
}

/// Totals across every token plus the current leader.
pub fn stats(conn: &Connection) -> Result<TokenStats> {
    let (total_tokens, total_votes): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(votes), 0) FROM tokens",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let top_token = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM tokens ORDER BY votes DESC, seq ASC LIMIT 1"),
            [],
            from_row,
        )
        .optional()?;

    Ok(TokenStats {
        total_tokens: total_tokens as u64,
        total_votes: total_votes as u64,
        top_token,
    })
}

fn query_list<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Token>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        name: row.get(1)?,
        ticker: row.get(2)?,
        image_url: row.get(3)?,
        pumpfun_link: row.get(4)?,
        votes: row.get::<_, i64>(5)? as u64,
        created_at: row.get::<_, i64>(6)? as u64,
    })
}
