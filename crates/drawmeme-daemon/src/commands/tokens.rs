//! Token launch, listing and voting handlers.

use std::sync::Arc;

use drawmeme_types::{validate, NewToken};
use serde_json::Value;
use tracing::info;

use super::{required_str, to_json, Result};
use crate::events::{Event, TOKEN_LAUNCHED, VOTE_RECORDED};
use crate::launch;
use crate::rpc::RpcError;
use crate::uploads::UploadError;
use crate::DaemonState;

/// Voter identity used when the front end could not determine one.
const UNKNOWN_VOTER: &str = "unknown";

/// All tokens in launch order.
pub async fn list_tokens(state: &Arc<DaemonState>) -> Result {
    to_json(&state.registry.list_all_tokens()?)
}

/// Newest tokens first. A missing, non-numeric or non-positive `limit`
/// falls back to the configured default.
pub async fn recent_tokens(state: &Arc<DaemonState>, params: &Value) -> Result {
    let limit = parse_limit(params.get("limit"), state.config.feed.recent_limit());
    to_json(&state.registry.list_recent_tokens(limit)?)
}

/// Tokens by votes, highest first.
pub async fn trending_tokens(state: &Arc<DaemonState>) -> Result {
    to_json(&state.registry.list_tokens_by_votes()?)
}

/// A single token.
pub async fn get_token(state: &Arc<DaemonState>, params: &Value) -> Result {
    let id = required_str(params, "id")?;
    let token = state
        .registry
        .get_token(id)?
        .ok_or_else(RpcError::token_not_found)?;
    to_json(&token)
}

/// Totals and the current leader.
pub async fn token_stats(state: &Arc<DaemonState>) -> Result {
    to_json(&state.registry.token_stats()?)
}

/// Store the drawing, run the mock deployment and record the token.
pub async fn launch_token(state: &Arc<DaemonState>, params: &Value) -> Result {
    let image = params
        .get("image_base64")
        .and_then(|v| v.as_str())
        .ok_or(UploadError::Missing)?;
    let name = validate::token_name(required_str(params, "name")?)?;
    let ticker = validate::ticker(required_str(params, "ticker")?)?;
    let content_type = params.get("content_type").and_then(|v| v.as_str());

    let image_url = state.images.save_base64(image, content_type).await?;
    let pumpfun_link = launch::deploy(&state.config.launch, &ticker).await;

    let token = match state.registry.create_token(NewToken {
        name,
        ticker,
        image_url: image_url.clone(),
        pumpfun_link: Some(pumpfun_link),
    }) {
        Ok(token) => token,
        Err(e) => {
            state.images.discard(&image_url).await;
            return Err(e.into());
        }
    };

    info!("Launched token {} ({})", token.ticker, token.id);
    state.event_bus.emit(Event::now(
        TOKEN_LAUNCHED,
        serde_json::json!({"token_id": token.id, "name": token.name, "ticker": token.ticker}),
    ));

    let mut result = to_json(&token)?;
    if let Value::Object(map) = &mut result {
        map.insert(
            "message".to_string(),
            Value::String("Token launched successfully!".to_string()),
        );
    }
    Ok(result)
}

/// Record a vote. The registry rejects repeats, so no pre-check is done.
pub async fn vote_token(state: &Arc<DaemonState>, params: &Value) -> Result {
    let id = required_str(params, "id")?;
    let voter = params
        .get("voter")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_VOTER);

    let (_, votes) = state.registry.record_vote(id, voter)?;

    state.event_bus.emit(Event::now(
        VOTE_RECORDED,
        serde_json::json!({"token_id": id, "votes": votes}),
    ));

    Ok(serde_json::json!({
        "message": "Vote added successfully",
        "votes": votes,
    }))
}

/// Whether `voter` already voted for the token. Advisory only.
pub async fn has_voted(state: &Arc<DaemonState>, params: &Value) -> Result {
    let id = required_str(params, "id")?;
    let voter = required_str(params, "voter")?;
    let voted = state.registry.has_voted(id, voter)?;
    Ok(serde_json::json!({"voted": voted}))
}

/// Every vote cast for a token.
pub async fn get_token_votes(state: &Arc<DaemonState>, params: &Value) -> Result {
    let id = required_str(params, "id")?;
    if state.registry.get_token(id)?.is_none() {
        return Err(RpcError::token_not_found());
    }
    to_json(&state.registry.get_token_votes(id)?)
}

fn parse_limit(value: Option<&Value>, default: usize) -> usize {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(default),
        _ => default,
    }
}
