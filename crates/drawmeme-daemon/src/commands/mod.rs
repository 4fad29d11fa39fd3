//! RPC command handlers.
//!
//! Each submodule implements the commands for one area. Handlers validate
//! params, call the registry, and shape the JSON result.

pub mod bot;
pub mod tokens;
pub mod users;

use serde::Serialize;
use serde_json::Value;

use crate::rpc::RpcError;

type Result = std::result::Result<Value, RpcError>;

/// Fetch a required string param.
fn required_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

/// Fetch an optional identifier that may arrive as a string or a number.
/// Empty strings count as absent.
fn optional_id(params: &Value, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str() {
        let params = serde_json::json!({"id": "abc", "n": 5});
        assert_eq!(required_str(&params, "id").ok(), Some("abc"));
        assert!(required_str(&params, "n").is_err());
        assert!(required_str(&params, "missing").is_err());
    }

    #[test]
    fn test_optional_id() {
        let params = serde_json::json!({"a": "  42 ", "b": 1001, "c": "", "d": null});
        assert_eq!(optional_id(&params, "a").as_deref(), Some("42"));
        assert_eq!(optional_id(&params, "b").as_deref(), Some("1001"));
        assert_eq!(optional_id(&params, "c"), None);
        assert_eq!(optional_id(&params, "d"), None);
        assert_eq!(optional_id(&params, "e"), None);
    }
}
