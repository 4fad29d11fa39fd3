//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC calls to the command handlers. Every error
//! carries an HTTP-style `status` in its data so an HTTP front can relay it
//! unchanged.

use std::path::PathBuf;
use std::sync::Arc;

use drawmeme_db::DbError;
use drawmeme_types::{IdentityField, ValidationError};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::uploads::UploadError;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// `status` plus a human readable `detail`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    fn new(code: i32, message: &str, status: u16, detail: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: Some(serde_json::json!({"status": status, "detail": detail})),
        }
    }

    /// HTTP-style status carried in `data`.
    pub fn status(&self) -> Option<u16> {
        self.data
            .as_ref()
            .and_then(|d| d.get("status"))
            .and_then(|s| s.as_u64())
            .and_then(|s| u16::try_from(s).ok())
    }

    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self::new(-32700, "PARSE_ERROR", 400, "Malformed request")
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self::new(-32600, "INVALID_REQUEST", 400, "Expected JSON-RPC 2.0")
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            -32601,
            "METHOD_NOT_FOUND",
            404,
            &format!("Unknown method '{method}'"),
        )
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self::new(-32602, "INVALID_PARAMS", 400, detail)
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self::new(-32603, "INTERNAL_ERROR", 500, detail)
    }

    // Registry errors

    /// User not found (-32020).
    pub fn user_not_found() -> Self {
        Self::new(-32020, "USER_NOT_FOUND", 404, "User not found")
    }

    /// Token not found (-32021).
    pub fn token_not_found() -> Self {
        Self::new(-32021, "TOKEN_NOT_FOUND", 404, "Token not found")
    }

    /// Solana address taken (-32030).
    pub fn address_already_registered() -> Self {
        Self::new(
            -32030,
            "ADDRESS_ALREADY_REGISTERED",
            400,
            "Solana address already registered",
        )
    }

    /// Telegram id taken (-32031).
    pub fn telegram_already_linked() -> Self {
        Self::new(
            -32031,
            "TELEGRAM_ALREADY_LINKED",
            400,
            "Telegram account already linked to another user",
        )
    }

    /// Repeat vote (-32032).
    pub fn already_voted() -> Self {
        Self::new(
            -32032,
            "ALREADY_VOTED",
            400,
            "You have already voted for this token",
        )
    }

    /// Rejected upload (-32040).
    pub fn invalid_image(detail: &str) -> Self {
        Self::new(-32040, "INVALID_IMAGE", 400, detail)
    }
}

impl From<DbError> for RpcError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => Self::user_not_found(),
            DbError::TokenNotFound(_) => Self::token_not_found(),
            DbError::DuplicateIdentity(IdentityField::SolanaAddress) => {
                Self::address_already_registered()
            }
            DbError::DuplicateIdentity(IdentityField::TelegramId) => {
                Self::telegram_already_linked()
            }
            DbError::DuplicateVote { .. } => Self::already_voted(),
            other => {
                error!("Registry failure: {}", other);
                Self::internal_error(&other.to_string())
            }
        }
    }
}

impl From<ValidationError> for RpcError {
    fn from(err: ValidationError) -> Self {
        Self::invalid_params(&err.to_string())
    }
}

impl From<UploadError> for RpcError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => {
                error!("Upload write failed: {}", e);
                Self::internal_error("Failed to store image")
            }
            other => Self::invalid_image(&other.to_string()),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("RPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(state.clone(), &line).await;

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse one request line and produce its response.
pub async fn handle_line(state: Arc<DaemonState>, line: &str) -> RpcResponse {
    match serde_json::from_str::<RpcRequest>(line) {
        Ok(request) if request.jsonrpc != "2.0" => {
            RpcResponse::error(request.id, RpcError::invalid_request())
        }
        Ok(request) => dispatch_request(state, request).await,
        Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
    }
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();
    let params = &request.params;

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Users
        "register_user" => commands::users::register_user(&state, params).await,
        "check_address" => commands::users::check_address(&state, params).await,
        "login" => commands::users::login(&state, params).await,
        "update_user" => commands::users::update_user(&state, params).await,

        // Tokens
        "list_tokens" => commands::tokens::list_tokens(&state).await,
        "recent_tokens" => commands::tokens::recent_tokens(&state, params).await,
        "trending_tokens" => commands::tokens::trending_tokens(&state).await,
        "get_token" => commands::tokens::get_token(&state, params).await,
        "launch_token" => commands::tokens::launch_token(&state, params).await,
        "token_stats" => commands::tokens::token_stats(&state).await,

        // Votes
        "vote_token" => commands::tokens::vote_token(&state, params).await,
        "has_voted" => commands::tokens::has_voted(&state, params).await,
        "get_token_votes" => commands::tokens::get_token_votes(&state, params).await,

        // Bot
        "bot_start" => commands::bot::bot_start(&state, params).await,
        "bot_callback" => commands::bot::bot_callback(&state, params).await,
        "bot_message" => commands::bot::bot_message(&state, params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => {
            debug!("RPC method {} failed: {} (status {:?})", method, err.message, err.status());
            RpcResponse::error(id, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::test_state;

    #[test]
    fn test_rpc_error_codes() {
        let err = RpcError::already_voted();
        assert_eq!(err.code, -32032);
        assert_eq!(err.message, "ALREADY_VOTED");
        assert_eq!(err.status(), Some(400));

        assert_eq!(RpcError::token_not_found().status(), Some(404));
        assert_eq!(RpcError::internal_error("x").status(), Some(500));
        assert_eq!(RpcError::method_not_found("unknown").code, -32601);
    }

    #[test]
    fn test_db_error_mapping_is_distinct() {
        let cases = [
            (DbError::NotFound("user".into()), "USER_NOT_FOUND"),
            (DbError::TokenNotFound("t".into()), "TOKEN_NOT_FOUND"),
            (
                DbError::DuplicateIdentity(IdentityField::SolanaAddress),
                "ADDRESS_ALREADY_REGISTERED",
            ),
            (
                DbError::DuplicateIdentity(IdentityField::TelegramId),
                "TELEGRAM_ALREADY_LINKED",
            ),
            (
                DbError::DuplicateVote {
                    token_id: "t".into(),
                    voter_identity: "v".into(),
                },
                "ALREADY_VOTED",
            ),
            (DbError::LockPoisoned, "INTERNAL_ERROR"),
        ];
        for (err, expected) in cases {
            assert_eq!(RpcError::from(err).message, expected);
        }
    }

    #[test]
    fn test_rpc_response_shapes() {
        let ok = RpcResponse::success(serde_json::json!(1), serde_json::json!({"votes": 1}));
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());

        let err = RpcResponse::error(serde_json::json!(1), RpcError::internal_error("test"));
        assert!(err.result.is_none());
        assert!(err.error.is_some());
    }

    #[tokio::test]
    async fn test_handle_line_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());

        let resp = handle_line(state.clone(), "{not json").await;
        assert_eq!(resp.error.map(|e| e.code), Some(-32700));

        let resp = handle_line(
            state.clone(),
            r#"{"jsonrpc":"1.0","id":1,"method":"list_tokens"}"#,
        )
        .await;
        assert_eq!(resp.error.map(|e| e.code), Some(-32600));

        let resp = handle_line(
            state.clone(),
            r#"{"jsonrpc":"2.0","id":2,"method":"mint_nft"}"#,
        )
        .await;
        assert_eq!(resp.error.map(|e| e.code), Some(-32601));

        let resp = handle_line(state, r#"{"jsonrpc":"2.0","id":3,"method":"list_tokens"}"#).await;
        assert_eq!(resp.result, Some(serde_json::json!([])));
        assert_eq!(resp.id, serde_json::json!(3));
    }

    #[tokio::test]
    async fn test_socket_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let socket_path = dir.path().join("test.sock");

        let server = RpcServer::new(state, socket_path.clone());
        let server_task = tokio::spawn(async move { server.run().await });

        let mut stream = None;
        for _ in 0..50 {
            match tokio::net::UnixStream::connect(&socket_path).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        }
        let stream = stream.expect("connect to server");
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"token_stats\"}\n")
            .await
            .expect("write");

        let mut line = String::new();
        BufReader::new(reader)
            .read_line(&mut line)
            .await
            .expect("read");
        let resp: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(resp["id"], 7);
        assert_eq!(resp["result"]["total_tokens"], 0);

        server_task.abort();
    }
}
