//! JSON-RPC 2.0 server over a Unix socket.
//!
//! One request per line, one response per line. After a successful
//! `subscribe_events` the same connection also receives
//! `{"jsonrpc":"2.0","method":"event","params":{..}}` notifications until
//! `unsubscribe_events` or disconnect.

use std::path::PathBuf;
use std::sync::Arc;

use gigline_deputy::DeputyError;
use gigline_gig::GigError;
use gigline_types::ErrorKind;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::UnixListener;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::events::EventFilter;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Echoed back on the response.
    pub id: serde_json::Value,
    /// Command name, e.g. `transition_gig`.
    pub method: String,
    /// Named parameters. Missing means `null`.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,
    /// ID of the request this answers.
    pub id: serde_json::Value,
    /// Command output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Set instead of `result` on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// JSON-RPC error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Domain errors carry `{"kind": ..}` here.
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
    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self {
            code: -32600,
            message: "INVALID_REQUEST".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// A recoverable domain error. `data.kind` carries the kebab-case kind.
    pub fn domain(kind: ErrorKind, detail: &str) -> Self {
        let (code, message) = match kind {
            ErrorKind::Forbidden => (-32030, "FORBIDDEN"),
            ErrorKind::InvalidTransition => (-32031, "INVALID_TRANSITION"),
            ErrorKind::InvalidTarget => (-32032, "INVALID_TARGET"),
            ErrorKind::InsufficientTrust => (-32033, "INSUFFICIENT_TRUST"),
            ErrorKind::Conflict => (-32034, "CONFLICT"),
            ErrorKind::NotFound => (-32035, "NOT_FOUND"),
            ErrorKind::Storage => return Self::internal_error(detail),
        };
        Self {
            code,
            message: message.to_string(),
            data: Some(serde_json::json!({"kind": kind, "detail": detail})),
        }
    }
}

impl From<DeputyError> for RpcError {
    fn from(e: DeputyError) -> Self {
        Self::domain(e.kind(), &e.to_string())
    }
}

impl From<GigError> for RpcError {
    fn from(e: GigError) -> Self {
        Self::domain(e.kind(), &e.to_string())
    }
}

impl From<gigline_types::StoreError> for RpcError {
    fn from(e: gigline_types::StoreError) -> Self {
        Self::domain(e.kind(), &e.to_string())
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

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

type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

async fn write_line<T: Serialize>(writer: &SharedWriter, message: &T) -> anyhow::Result<()> {
    let mut json = serde_json::to_string(message)?;
    json.push('\n');
    let mut writer = writer.lock().await;
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Forward matching events to one connection until it goes away.
fn spawn_forwarder(state: &Arc<DaemonState>, writer: SharedWriter, filter: EventFilter) -> JoinHandle<()> {
    let mut rx = state.event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !filter.matches(&event) {
                        continue;
                    }
                    let notification = serde_json::json!({
                        "jsonrpc": "2.0",
                        "method": "event",
                        "params": event,
                    });
                    if let Err(e) = write_line(&writer, &notification).await {
                        debug!("Event subscriber gone: {}", e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, writer) = stream.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(writer));
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let mut forwarder: Option<JoinHandle<()>> = None;

    let result = loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => break Err(e.into()),
        };
        if bytes_read == 0 {
            break Ok(()); // EOF
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) if request.jsonrpc != "2.0" => {
                RpcResponse::error(request.id, RpcError::invalid_request())
            }
            Ok(request) => {
                let method = request.method.clone();
                let params = request.params.clone();
                let response = dispatch_request(state.clone(), request).await;
                if response.error.is_none() {
                    match method.as_str() {
                        "subscribe_events" => {
                            let filter = params
                                .get("filter")
                                .cloned()
                                .and_then(|f| serde_json::from_value(f).ok())
                                .unwrap_or_default();
                            if let Some(old) = forwarder.replace(spawn_forwarder(&state, writer.clone(), filter)) {
                                old.abort();
                            }
                        }
                        "unsubscribe_events" => {
                            if let Some(old) = forwarder.take() {
                                old.abort();
                            }
                        }
                        _ => {}
                    }
                }
                response
            }
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        if let Err(e) = write_line(&writer, &response).await {
            break Err(e);
        }
    };

    if let Some(task) = forwarder {
        task.abort();
    }
    result
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
pub async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();
    let params = &request.params;

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Profiles
        "sync_profile" => commands::profile::sync_profile(&state, params).await,

        // Trust
        "get_trust_assessment" => commands::trust::get_trust_assessment(&state, params).await,
        "get_feature_eligibility" => {
            commands::trust::get_feature_eligibility(&state, params).await
        }
        "check_feature" => commands::trust::check_feature(&state, params).await,

        // Deputies
        "send_deputy_request" => commands::deputy::send_deputy_request(&state, params).await,
        "respond_to_deputy_request" => {
            commands::deputy::respond_to_deputy_request(&state, params).await
        }
        "remove_deputy" => commands::deputy::remove_deputy(&state, params).await,
        "update_deputy_settings" => commands::deputy::update_deputy_settings(&state, params).await,
        "check_deputy_eligibility" => {
            commands::deputy::check_deputy_eligibility(&state, params).await
        }
        "get_deputies" => commands::deputy::get_deputies(&state, params).await,
        "get_pending_deputy_requests" => {
            commands::deputy::get_pending_deputy_requests(&state, params).await
        }

        // Gigs
        "create_gig" => commands::gig::create_gig(&state, params).await,
        "get_gig" => commands::gig::get_gig(&state, params).await,
        "get_my_gigs" => commands::gig::get_my_gigs(&state, params).await,
        "get_eligible_deputies" => commands::gig::get_eligible_deputies(&state, params).await,
        "transition_gig" => commands::gig::transition_gig(&state, params).await,
        "update_gig_availability" => {
            commands::gig::update_gig_availability(&state, params).await
        }

        // Event subscription
        "subscribe_events" => commands::system::subscribe_events(&state, params).await,
        "unsubscribe_events" => commands::system::unsubscribe_events(&state, params).await,
        "get_daemon_status" => commands::system::get_daemon_status(&state).await,
        "shutdown" => commands::system::shutdown(&state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
