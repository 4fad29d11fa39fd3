//! The registry: sole owner and mutator of users, tokens and votes.
//!
//! Every operation runs under one mutex around the connection, so reads see
//! a consistent snapshot and the vote path (token check, duplicate check,
//! insert, increment) is a single critical section. The vote path also runs
//! in a transaction so the record and the counter commit together.

use std::sync::{Arc, Mutex, MutexGuard};

use drawmeme_types::{
    IdentityField, NewToken, NewUser, Token, TokenStats, User, UserUpdate, Vote,
};
use rusqlite::Connection;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::ids::new_id;
use crate::queries::{tokens, users, votes};
use crate::{DbError, Result};

/// In-memory store of users, launched tokens and votes.
pub struct Registry {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

impl Registry {
    /// Create an empty registry stamped by the wall clock.
    pub fn new() -> Result<Self> {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty registry with a custom time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(crate::open_memory()?),
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// Register a user. Fails with `DuplicateIdentity` if the Solana
    /// address or the Telegram id is already taken.
    pub fn create_user(&self, user: NewUser) -> Result<User> {
        let conn = self.lock()?;

        if users::find_by_solana_address(&conn, &user.solana_address)?.is_some() {
            return Err(DbError::DuplicateIdentity(IdentityField::SolanaAddress));
        }
        if let Some(telegram_id) = user.telegram_id.as_deref() {
            if users::find_by_telegram_id(&conn, telegram_id)?.is_some() {
                return Err(DbError::DuplicateIdentity(IdentityField::TelegramId));
            }
        }

        let created = users::insert(&conn, &new_id(), &user, self.clock.now_millis())?;
        debug!(user_id = %created.id, "user registered");
        Ok(created)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        match users::get(&conn, id) {
            Ok(user) => Ok(Some(user)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn find_user_by_solana_address(&self, address: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        users::find_by_solana_address(&conn, address)
    }

    pub fn find_user_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        users::find_by_telegram_id(&conn, telegram_id)
    }

    /// Merge the present fields into the user and bump `updated_at`.
    ///
    /// Linking a Telegram id already held by another user fails with
    /// `DuplicateIdentity`.
    pub fn update_user(&self, id: &str, update: UserUpdate) -> Result<User> {
        let conn = self.lock()?;

        users::get(&conn, id)?;
        if let Some(telegram_id) = update.telegram_id.as_deref() {
            if let Some(holder) = users::find_by_telegram_id(&conn, telegram_id)? {
                if holder.id != id {
                    return Err(DbError::DuplicateIdentity(IdentityField::TelegramId));
                }
            }
        }

        let updated = users::update(&conn, id, &update, self.clock.now_millis())?;
        debug!(user_id = %id, "user updated");
        Ok(updated)
    }

    // ---------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------

    /// Record a launched token with zero votes. Names and tickers may repeat.
    pub fn create_token(&self, token: NewToken) -> Result<Token> {
        let conn = self.lock()?;
        let created = tokens::insert(&conn, &new_id(), &token, self.clock.now_millis())?;
        debug!(token_id = %created.id, ticker = %created.ticker, "token created");
        Ok(created)
    }

    pub fn get_token(&self, id: &str) -> Result<Option<Token>> {
        let conn = self.lock()?;
        tokens::find(&conn, id)
    }

    /// Every token in launch order.
    pub fn list_all_tokens(&self) -> Result<Vec<Token>> {
        let conn = self.lock()?;
        tokens::list_all(&conn)
    }

    /// Every token by votes, highest first; equal counts keep launch order.
    pub fn list_tokens_by_votes(&self) -> Result<Vec<Token>> {
        let conn = self.lock()?;
        tokens::list_by_votes(&conn)
    }

    /// The `limit` newest tokens, newest first.
    pub fn list_recent_tokens(&self, limit: usize) -> Result<Vec<Token>> {
        let conn = self.lock()?;
        tokens::list_recent(&conn, limit)
    }

    pub fn token_stats(&self) -> Result<TokenStats> {
        let conn = self.lock()?;
        tokens::stats(&conn)
    }

    // ---------------------------------------------------------------
    // Votes
    // ---------------------------------------------------------------

    /// Record one vote by `voter_identity` for `token_id` and bump the
    /// token's counter. Returns the vote and the counter as committed.
    ///
    /// Fails with `TokenNotFound` for an unknown token and `DuplicateVote`
    /// if this identity already voted for it. On failure nothing changes.
    pub fn record_vote(&self, token_id: &str, voter_identity: &str) -> Result<(Vote, u64)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if !tokens::exists(&tx, token_id)? {
            return Err(DbError::TokenNotFound(token_id.to_string()));
        }
        if votes::exists(&tx, token_id, voter_identity)? {
            return Err(DbError::DuplicateVote {
                token_id: token_id.to_string(),
                voter_identity: voter_identity.to_string(),
            });
        }

        let vote = votes::insert(
            &tx,
            &new_id(),
            token_id,
            voter_identity,
            self.clock.now_millis(),
        )?;
        let total = tokens::increment_votes(&tx, token_id)?;
        tx.commit()?;

        debug!(token_id = %token_id, votes = total, "vote recorded");
        Ok((vote, total))
    }

    /// Advisory pre-check. `record_vote` is what actually enforces one
    /// vote per identity.
    pub fn has_voted(&self, token_id: &str, voter_identity: &str) -> Result<bool> {
        let conn = self.lock()?;
        votes::exists(&conn, token_id, voter_identity)
    }

    pub fn get_token_votes(&self, token_id: &str) -> Result<Vec<Vote>> {
        let conn = self.lock()?;
        votes::list_for_token(&conn, token_id)
    }
}
