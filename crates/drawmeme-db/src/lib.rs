//! # drawmeme-db
//!
//! The registry of users, launched tokens and votes.
//!
//! State lives in a private in-memory SQLite connection owned by a
//! [`Registry`]. Nothing is written to disk and nothing survives a
//! restart.
//!
//! ## Schema
//!
//! - Foreign keys enforced (a vote must reference an existing token)
//! - UNIQUE indexes back `solana_address`, `telegram_id` and
//!   `(token_id, voter_identity)`
//! - All timestamps are Unix epoch milliseconds (u64)
//! - Schema version stored in `PRAGMA user_version`

pub mod clock;
pub mod ids;
pub mod migrations;
pub mod queries;
pub mod registry;
pub mod schema;

use drawmeme_types::IdentityField;
use rusqlite::Connection;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::Registry;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Registry error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate identity: {0} already registered")]
    DuplicateIdentity(IdentityField),

    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("duplicate vote by {voter_identity} for token {token_id}")]
    DuplicateVote {
        token_id: String,
        voter_identity: String,
    },

    #[error("registry lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open a fresh in-memory database with the schema applied.
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}

/// Map a UNIQUE violation on a users column to the colliding field.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<IdentityField> {
    match err {
        rusqlite::Error::SqliteFailure(e, msg)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            let msg = msg.as_deref().unwrap_or_default();
            if msg.contains("users.telegram_id") {
                Some(IdentityField::TelegramId)
            } else if msg.contains("users.solana_address") {
                Some(IdentityField::SolanaAddress)
            } else {
                None
            }
        }
        _ => None,
    }
}
