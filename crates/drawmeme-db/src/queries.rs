//! Query functions organized by entity.
//!
//! Each function takes a borrowed connection plus explicit ids and
//! timestamps, so callers decide the clock and the locking.

pub mod tokens;
pub mod users;
pub mod votes;
