//! User identity records.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{EntityId, TimestampMillis};

/// A registered user.
///
/// `solana_address` is unique across all users and never changes after
/// registration. `telegram_id`, when present, is unique as well.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct User {
    pub id: EntityId,
    pub solana_address: String,
    pub telegram_id: Option<String>,
    pub telegram_username: Option<String>,
    /// Serialized as `"true"` / `"false"`.
    #[serde_as(as = "DisplayFromStr")]
    #[ts(type = "string")]
    pub is_verified: bool,
    pub created_at: TimestampMillis,
    pub updated_at: TimestampMillis,
}

/// Registration payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub solana_address: String,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    pub telegram_username: Option<String>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

impl UserUpdate {
    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.telegram_id.is_none() && self.telegram_username.is_none() && self.is_verified.is_none()
    }
}

/// The subset of a user returned from registration and login.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct PublicUser {
    pub id: EntityId,
    pub solana_address: String,
    #[serde_as(as = "DisplayFromStr")]
    #[ts(type = "string")]
    pub is_verified: bool,
    pub created_at: TimestampMillis,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            solana_address: user.solana_address.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Which unique user attribute collided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    SolanaAddress,
    TelegramId,
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SolanaAddress => f.write_str("solana_address"),
            Self::TelegramId => f.write_str("telegram_id"),
        }
    }
}
