//! Launched meme tokens.

use serde::{Deserialize, Serialize};

use crate::{EntityId, TimestampMillis};

/// A launched creation: name, ticker, image reference and vote tally.
///
/// `votes` only ever changes through the registry's vote operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Token {
    pub id: EntityId,
    pub name: String,
    /// Upper case, 2-10 chars.
    pub ticker: String,
    /// Reference to the stored image, e.g. `/uploads/<file>.png`.
    pub image_url: String,
    /// Mock deployment link generated at launch.
    pub pumpfun_link: Option<String>,
    pub votes: u64,
    pub created_at: TimestampMillis,
}

/// Launch payload. Values are expected to be validated by the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewToken {
    pub name: String,
    pub ticker: String,
    pub image_url: String,
    #[serde(default)]
    pub pumpfun_link: Option<String>,
}

/// Aggregate numbers shown by the bot's stats menu.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct TokenStats {
    pub total_tokens: u64,
    pub total_votes: u64,
    pub top_token: Option<Token>,
}
