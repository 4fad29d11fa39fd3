//! Vote facts.

use serde::{Deserialize, Serialize};

use crate::{EntityId, TimestampMillis};

/// "This identity voted for this token." Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Vote {
    pub id: EntityId,
    pub token_id: EntityId,
    /// Caller-supplied identity, usually the network origin address.
    pub voter_identity: String,
    pub timestamp: TimestampMillis,
}
