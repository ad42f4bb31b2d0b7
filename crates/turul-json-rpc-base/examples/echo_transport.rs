//! In-process transport example
//!
//! Shows how a transport backend embeds the message layer: requests are built
//! and registered, encoded to bytes, answered by a toy server living in the same
//! process, then decoded and validated against the pending request table.
//!
//! Run with `RUST_LOG=debug cargo run --example echo_transport` to see the
//! message layer's own logging.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use turul_json_rpc_base::prelude::*;

/// Connectivity failures belong to the transport, next to the core's own errors
#[derive(Error, Debug)]
enum TransportError {
    #[error("server closed the connection")]
    Closed,
}

#[derive(Error, Debug)]
enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Rpc(#[from] JsonRpcBaseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A toy server that understands `math.subtract` and answers everything else
/// with "Method not found"
fn toy_server(bytes: &[u8]) -> Result<Vec<u8>, TransportError> {
    let payload: Value = serde_json::from_slice(bytes).map_err(|_| TransportError::Closed)?;

    let answer = |request: &Value| -> Option<Value> {
        let id = request.get("id")?.clone();
        Some(match request["method"].as_str() {
            Some("math.subtract") => {
                let params = &request["params"];
                let (a, b) = match params {
                    Value::Array(args) => (args[0].as_i64()?, args[1].as_i64()?),
                    _ => (params["minuend"].as_i64()?, params["subtrahend"].as_i64()?),
                };
                json!({"jsonrpc": "2.0", "result": a - b, "id": id})
            }
            _ => json!({
                "jsonrpc": "2.0",
                "error": {"code": METHOD_NOT_FOUND, "message": "Method not found"},
                "id": id
            }),
        })
    };

    let reply = match &payload {
        Value::Array(batch) => Value::Array(batch.iter().filter_map(answer).rev().collect()),
        single => answer(single).unwrap_or(Value::Null),
    };
    serde_json::to_vec(&reply).map_err(|_| TransportError::Closed)
}

struct InProcessTransport {
    pending: Arc<PendingRequestTable>,
    builder: MessageBuilder,
}

impl InProcessTransport {
    fn new() -> Self {
        let pending = Arc::new(PendingRequestTable::new());
        Self {
            builder: MessageBuilder::new(pending.clone()),
            pending,
        }
    }

    fn call(&self, request: JsonRpcRequest) -> Result<Value, CallError> {
        let bytes = toy_server(&serde_json::to_vec(&request)?)?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        Ok(validate_response(&payload, &self.pending)?)
    }

    fn call_batch(&self, batch: &BatchRequest) -> Result<BatchResponse, CallError> {
        let bytes = toy_server(&serde_json::to_vec(batch)?)?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        Ok(ResponseValidator::new(&self.pending).validate_batch_for(batch, &payload)?)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let transport = InProcessTransport::new();
    let builder = &transport.builder;

    let request = builder
        .method("math")
        .segment("subtract")
        .request(Arguments::positional(vec![json!(42), json!(23)]))?;
    let difference = transport.call(request).context("positional call")?;
    info!(%difference, "math.subtract(42, 23)");

    let request = builder.method("math").segment("subtract").request(
        Arguments::none()
            .with_kwarg("minuend", 42)
            .with_kwarg("subtrahend", 23),
    )?;
    let difference = transport.call(request).context("named call")?;
    info!(%difference, "math.subtract(minuend=42, subtrahend=23)");

    let request = builder.build_request("math.divide", Arguments::none())?;
    match transport.call(request) {
        Err(CallError::Rpc(error)) if error.is_application_error() => {
            info!(code = ?error.error_code(), %error, "Server rejected the call");
        }
        other => anyhow::bail!("expected an application error, got {:?}", other),
    }

    let batch = builder.build_batch(vec![
        builder.build("math.subtract", vec![json!(10), json!(3)].into(), false)?,
        builder.build("log.event", vec![json!("batch sent")].into(), true)?,
        builder.build("math.unknown", Arguments::none(), false)?,
    ])?;
    let responses = transport.call_batch(&batch).context("batch call")?;
    for id in batch.request_ids() {
        info!(%id, outcome = ?responses.get(&id), "Batch entry");
    }
    for violation in &responses.violations {
        tracing::warn!(id = ?violation.id, error = %violation.error, "Broken batch entry");
    }

    // The server may call back into the client over the same connection
    let mut handlers = ServerRequestHandlers::new();
    handlers.register("client.describe", |params: Option<&RequestParams>| match params {
        Some(params) if params.is_object() => Ok(params.to_value()),
        _ => Err(HandlerError::new("expected named params")),
    });
    let inbound = json!({
        "jsonrpc": "2.0",
        "method": "client.describe",
        "params": {"name": "echo_transport"},
        "id": "server-1"
    });
    if let Some(reply) = handlers.receive_value(&inbound)? {
        info!(reply = %reply.to_value()?, "Answered server request");
    }

    info!(pending = transport.pending.len(), "Done");
    Ok(())
}
