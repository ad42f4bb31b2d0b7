//! Requests initiated by the server over a bidirectional transport
//!
//! Callers register a handler per method name; the transport hands every
//! incoming request to [`ServerRequestHandlers::receive_value`] and sends
//! back whatever reply it produces.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{JsonRpcErrorObject, ProtocolError};
use crate::request::RequestParams;
use crate::response::JsonRpcMessage;
use crate::types::RequestId;

/// Error code sent back when a handler fails
pub const HANDLER_FAILURE_CODE: i64 = -32000;

/// Failure returned by a registered handler
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub data: Option<Value>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

type Handler = Box<dyn Fn(Option<&RequestParams>) -> Result<Value, HandlerError> + Send + Sync>;

/// A request or notification received from the server
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcIncomingRequest {
    pub method: String,
    pub params: Option<RequestParams>,
    /// `None` for notifications
    pub id: Option<RequestId>,
}

impl JsonRpcIncomingRequest {
    /// Parse a decoded request object sent by the server
    pub fn parse(payload: &Value) -> Result<Self, ProtocolError> {
        let object = payload
            .as_object()
            .ok_or_else(|| ProtocolError::InvalidRequest("request is not an object".to_string()))?;

        let method = object
            .get("method")
            .ok_or_else(|| {
                ProtocolError::InvalidRequest("request from server does not contain method".to_string())
            })?
            .as_str()
            .ok_or_else(|| ProtocolError::InvalidRequest("method is not a string".to_string()))?
            .to_string();

        let params = match object.get("params") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(RequestParams::from_value(raw.clone()).ok_or_else(|| {
                ProtocolError::InvalidRequest(
                    "parameters must either be a positional list or named object".to_string(),
                )
            })?),
        };

        let id = match object.get("id") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                Some(RequestId::from_value(raw).ok_or_else(|| ProtocolError::InvalidId(raw.clone()))?)
            }
        };

        Ok(Self { method, params, id })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Registry of callbacks for server-initiated requests
#[derive(Default)]
pub struct ServerRequestHandlers {
    handlers: HashMap<String, Handler>,
}

impl std::fmt::Debug for ServerRequestHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerRequestHandlers")
            .field("methods", &self.registered_methods())
            .finish()
    }
}

impl ServerRequestHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; nested names use dotted paths (`"namespace.event"`)
    pub fn register<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<&RequestParams>) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Box::new(handler));
    }

    pub fn unregister(&mut self, method: &str) -> bool {
        self.handlers.remove(method).is_some()
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }

    /// Run the handler for `request`; notifications never produce a reply
    pub fn receive(&self, request: &JsonRpcIncomingRequest) -> Option<JsonRpcMessage> {
        let outcome = match self.handlers.get(&request.method) {
            Some(handler) => handler(request.params.as_ref()).map_err(|error| {
                warn!(method = %request.method, error = %error, "Server request handler failed");
                JsonRpcErrorObject::server_error(
                    HANDLER_FAILURE_CODE,
                    &format!("Server Error: {}", error.message),
                    error.data,
                )
            }),
            None => {
                debug!(method = %request.method, "No handler for server request");
                Err(JsonRpcErrorObject::method_not_found())
            }
        };

        let id = request.id.clone()?;
        Some(match outcome {
            Ok(result) => JsonRpcMessage::success(id, result),
            Err(error) => JsonRpcMessage::error(Some(id), error),
        })
    }

    /// Parse and handle a decoded payload in one step
    pub fn receive_value(&self, payload: &Value) -> Result<Option<JsonRpcMessage>, ProtocolError> {
        let request = JsonRpcIncomingRequest::parse(payload)?;
        Ok(self.receive(&request))
    }
}
