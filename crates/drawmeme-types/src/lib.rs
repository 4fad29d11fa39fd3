//! # drawmeme-types
//!
//! Shared domain types used across the DrawYourMeme workspace: users,
//! launched meme tokens, votes, and the input checks the request layer
//! runs before handing values to the registry.

pub mod token;
pub mod user;
pub mod validate;
pub mod vote;

pub use token::{NewToken, Token, TokenStats};
pub use user::{IdentityField, NewUser, PublicUser, User, UserUpdate};
pub use validate::ValidationError;
pub use vote::Vote;

/// Opaque entity identifier (32 lower-case hex chars).
pub type EntityId = String;

/// Unix epoch milliseconds.
pub type TimestampMillis = u64;

/// Maximum token name length in characters.
pub const MAX_TOKEN_NAME_LEN: usize = 50;

/// Minimum ticker length in characters.
pub const MIN_TICKER_LEN: usize = 2;

/// Maximum ticker length in characters.
pub const MAX_TICKER_LEN: usize = 10;

/// Default size of the "recent" feed when the registry is queried directly.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Shortest accepted Solana address (base58).
pub const MIN_SOLANA_ADDRESS_LEN: usize = 32;

/// Longest accepted Solana address (base58).
pub const MAX_SOLANA_ADDRESS_LEN: usize = 44;

#[cfg(test)]
mod tests {
    #[test]
    fn test_ticker_bounds_are_ordered() {
        assert!(super::MIN_TICKER_LEN < super::MAX_TICKER_LEN);
        assert!(super::MIN_SOLANA_ADDRESS_LEN < super::MAX_SOLANA_ADDRESS_LEN);
    }

    #[test]
    #[ignore] // Run manually to generate bindings
    fn export_ts_bindings() {
        use ts_rs::TS;
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bindings");
        std::fs::create_dir_all(&dir).expect("create bindings dir");
        crate::user::User::export_all_to(&dir).expect("export User");
        crate::user::PublicUser::export_all_to(&dir).expect("export PublicUser");
        crate::token::Token::export_all_to(&dir).expect("export Token");
        crate::token::TokenStats::export_all_to(&dir).expect("export TokenStats");
        crate::vote::Vote::export_all_to(&dir).expect("export Vote");
    }
}
