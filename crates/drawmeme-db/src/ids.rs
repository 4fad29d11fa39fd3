//! Entity id generation.

use drawmeme_types::EntityId;
use rand::RngCore;

/// Length of a generated id in hex characters.
pub const ID_LEN: usize = 32;

/// Generate a fresh 128-bit random id, hex encoded.
pub fn new_id() -> EntityId {
    let mut bytes = [0u8; ID_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
