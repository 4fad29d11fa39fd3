//! Integration test crate for the DrawYourMeme registry.
//!
//! This crate has no library code. It only contains tests that drive the
//! registry the way the request and bot layers do, across crate boundaries.
//!
//! ```sh
//! cargo test -p drawmeme-integration-tests
//! ```
