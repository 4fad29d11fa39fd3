//! User registration and lookup handlers.

use std::sync::Arc;

use drawmeme_types::{validate, NewUser, PublicUser, UserUpdate};
use serde_json::Value;
use tracing::info;

use super::{optional_id, required_str, to_json, Result};
use crate::events::{Event, USER_REGISTERED};
use crate::rpc::RpcError;
use crate::DaemonState;

/// Register a Solana address, optionally linked to a Telegram account.
pub async fn register_user(state: &Arc<DaemonState>, params: &Value) -> Result {
    let solana_address = required_str(params, "solana_address")?;
    validate::solana_address(solana_address)?;

    let user = state.registry.create_user(NewUser {
        solana_address: solana_address.to_string(),
        telegram_id: optional_id(params, "telegram_id"),
        telegram_username: optional_id(params, "telegram_username"),
    })?;

    info!("Registered user {}", user.id);
    state.event_bus.emit(Event::now(
        USER_REGISTERED,
        serde_json::json!({"user_id": user.id}),
    ));

    Ok(serde_json::json!({
        "message": "User registered successfully",
        "user": to_json(&PublicUser::from(&user))?,
    }))
}

/// Whether a Solana address is still free.
pub async fn check_address(state: &Arc<DaemonState>, params: &Value) -> Result {
    let address = required_str(params, "address")?;
    validate::solana_address(address)?;

    let existing = state.registry.find_user_by_solana_address(address)?;
    Ok(serde_json::json!({"available": existing.is_none()}))
}

/// Look a user up by Solana address. There is no credential check.
pub async fn login(state: &Arc<DaemonState>, params: &Value) -> Result {
    let solana_address = required_str(params, "solana_address")?;
    validate::solana_address(solana_address)?;

    let user = state
        .registry
        .find_user_by_solana_address(solana_address)?
        .ok_or_else(RpcError::user_not_found)?;

    Ok(serde_json::json!({
        "message": "Login successful",
        "user": to_json(&PublicUser::from(&user))?,
    }))
}

/// Link a Telegram account or flip the verified flag.
pub async fn update_user(state: &Arc<DaemonState>, params: &Value) -> Result {
    let id = required_str(params, "id")?;
    let is_verified = match params.get("is_verified") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) if s == "true" || s == "false" => Some(s == "true"),
        Some(_) => return Err(RpcError::invalid_params("is_verified must be a boolean")),
    };

    let update = UserUpdate {
        telegram_id: optional_id(params, "telegram_id"),
        telegram_username: optional_id(params, "telegram_username"),
        is_verified,
    };
    if update.is_empty() {
        return Err(RpcError::invalid_params("nothing to update"));
    }

    let user = state.registry.update_user(id, update)?;
    to_json(&user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_state;

    const ADDR: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[tokio::test]
    async fn test_register_and_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());

        let result = register_user(
            &state,
            &serde_json::json!({"solana_address": ADDR, "telegram_id": 1001}),
        )
        .await
        .expect("register");
        assert_eq!(result["user"]["solana_address"], ADDR);
        assert_eq!(result["user"]["is_verified"], "false");
        assert!(result["user"].get("telegram_id").is_none());

        let login_result = login(&state, &serde_json::json!({"solana_address": ADDR}))
            .await
            .expect("login");
        assert_eq!(login_result["user"]["id"], result["user"]["id"]);

        let linked = state
            .registry
            .find_user_by_telegram_id("1001")
            .expect("find");
        assert!(linked.is_some());
    }

    #[tokio::test]
    async fn test_register_duplicate_address() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let params = serde_json::json!({"solana_address": ADDR});

        register_user(&state, &params).await.expect("register");
        let err = register_user(&state, &params).await.expect_err("duplicate");
        assert_eq!(err.message, "ADDRESS_ALREADY_REGISTERED");
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_register_invalid_address() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let err = register_user(&state, &serde_json::json!({"solana_address": "0xdeadbeef"}))
            .await
            .expect_err("invalid");
        assert_eq!(err.code, -32602);
    }

    #[tokio::test]
    async fn test_check_address() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let params = serde_json::json!({"address": ADDR});

        let before = check_address(&state, &params).await.expect("check");
        assert_eq!(before["available"], true);

        register_user(&state, &serde_json::json!({"solana_address": ADDR}))
            .await
            .expect("register");
        let after = check_address(&state, &params).await.expect("check");
        assert_eq!(after["available"], false);
    }

    #[tokio::test]
    async fn test_login_unknown_address() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let err = login(&state, &serde_json::json!({"solana_address": ADDR}))
            .await
            .expect_err("unknown");
        assert_eq!(err.message, "USER_NOT_FOUND");
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_update_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let registered = register_user(&state, &serde_json::json!({"solana_address": ADDR}))
            .await
            .expect("register");
        let id = registered["user"]["id"].clone();

        let updated = update_user(
            &state,
            &serde_json::json!({"id": id, "telegram_username": "alice", "is_verified": true}),
        )
        .await
        .expect("update");
        assert_eq!(updated["telegram_username"], "alice");
        assert_eq!(updated["is_verified"], "true");

        let err = update_user(&state, &serde_json::json!({"id": id}))
            .await
            .expect_err("empty update");
        assert_eq!(err.code, -32602);

        let err = update_user(
            &state,
            &serde_json::json!({"id": "ghost", "telegram_username": "x"}),
        )
        .await
        .expect_err("missing");
        assert_eq!(err.message, "USER_NOT_FOUND");
    }
}
