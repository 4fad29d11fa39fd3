//! Chat-bot handlers. The bot transport forwards updates here and sends
//! back whatever reply it gets.

use std::sync::Arc;

use serde_json::Value;

use super::{optional_id, required_str, to_json, Result};
use crate::bot;
use crate::DaemonState;

/// `/start` from a chat user.
pub async fn bot_start(state: &Arc<DaemonState>, params: &Value) -> Result {
    let telegram_id = optional_id(params, "telegram_id");
    let telegram_username = optional_id(params, "telegram_username");
    let reply = bot::start(
        &state.registry,
        &state.config,
        telegram_id.as_deref(),
        telegram_username.as_deref(),
    );
    to_json(&reply)
}

/// An inline button press.
pub async fn bot_callback(state: &Arc<DaemonState>, params: &Value) -> Result {
    let data = required_str(params, "data")?;
    to_json(&bot::callback(&state.registry, &state.config, data))
}

/// A plain chat message. Returns `null` when the bot should stay quiet.
pub async fn bot_message(state: &Arc<DaemonState>, params: &Value) -> Result {
    let text = required_str(params, "text")?;
    match bot::message(&state.config, text) {
        Some(reply) => to_json(&reply),
        None => Ok(Value::Null),
    }
}
