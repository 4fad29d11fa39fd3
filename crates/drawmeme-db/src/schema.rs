//! SQL schema definitions.

/// Complete schema for the v1 registry.
///
/// `seq` columns record insertion order; listing queries use them as the
/// tie-break so equal sort keys keep creation order.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    solana_address TEXT NOT NULL UNIQUE,
    telegram_id TEXT UNIQUE,
    telegram_username TEXT,
    is_verified TEXT NOT NULL DEFAULT 'false',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- ============================================================
-- Tokens
-- ============================================================

CREATE TABLE IF NOT EXISTS tokens (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    ticker TEXT NOT NULL,
    image_url TEXT NOT NULL,
    pumpfun_link TEXT,
    votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
    created_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_tokens_votes ON tokens(votes DESC, seq);
CREATE INDEX IF NOT EXISTS idx_tokens_created ON tokens(created_at DESC);

-- ============================================================
-- Votes
-- ============================================================

CREATE TABLE IF NOT EXISTS votes (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    token_id TEXT NOT NULL REFERENCES tokens(id),
    voter_identity TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    UNIQUE (token_id, voter_identity)
);
"#;
