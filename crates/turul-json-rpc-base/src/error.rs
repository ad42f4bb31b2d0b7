//! Error taxonomy for building requests and validating responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::types::RequestId;

/// Result type for JSON-RPC message layer operations
pub type JsonRpcBaseResult<T> = Result<T, JsonRpcBaseError>;

/// Every failure this crate can surface to its caller.
///
/// Transport failures are deliberately absent: they belong to the backend that
/// embeds this crate and are reported alongside these kinds, not through them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonRpcBaseError {
    /// The payload violates the JSON-RPC protocol
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server reported a well-formed RPC failure
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The builder API was called with arguments that cannot form a request
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A batch must contain at least one message
    #[error("Batch must contain at least one request")]
    EmptyBatch,

    /// Two pending requests would share the same correlation identifier
    #[error("Duplicate request identifier: {0}")]
    DuplicateIdentifier(RequestId),
}

/// Ways a decoded payload can violate the JSON-RPC protocol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Batch response is not a JSON array")]
    NotABatch,

    #[error("Batch response is empty")]
    EmptyBatchResponse,

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("Response does not declare a protocol version")]
    MissingVersion,

    #[error("Response without a result or error field")]
    MissingResultAndError,

    #[error("Response contains both a result and an error field")]
    BothResultAndError,

    #[error("Malformed error object: {0}")]
    MalformedError(String),

    #[error("Invalid response id: {0}")]
    InvalidId(Value),

    #[error("Successful response without an id")]
    MissingId,

    #[error("Unexpected response id: {0}")]
    UnexpectedId(RequestId),

    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),
}

/// A well-formed error reported by the server for a single call.
///
/// `code`, `message` and `data` are preserved exactly as received.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("JSON-RPC Error {code}: {message}")]
pub struct ApplicationError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

impl ApplicationError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    /// The standard error kind this code falls into, if any
    pub fn kind(&self) -> Option<JsonRpcErrorCode> {
        JsonRpcErrorCode::from_code(self.code)
    }
}

impl From<JsonRpcErrorObject> for ApplicationError {
    fn from(error: JsonRpcErrorObject) -> Self {
        Self::new(error.code, error.message, error.data)
    }
}

impl JsonRpcBaseError {
    /// Create an invalid arguments error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Check if the error is a protocol violation
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Check if the error was reported by the server
    pub fn is_application_error(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    /// Check if the error was caused by misuse of the builder API
    pub fn is_builder_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments(_) | Self::EmptyBatch | Self::DuplicateIdentifier(_)
        )
    }

    /// The server-reported error, if this is one
    pub fn application_error(&self) -> Option<&ApplicationError> {
        match self {
            Self::Application(error) => Some(error),
            _ => None,
        }
    }

    /// Get the error code if this is a server-reported error
    pub fn error_code(&self) -> Option<i64> {
        self.application_error().map(|error| error.code)
    }
}

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => -32700,
            JsonRpcErrorCode::InvalidRequest => -32600,
            JsonRpcErrorCode::MethodNotFound => -32601,
            JsonRpcErrorCode::InvalidParams => -32602,
            JsonRpcErrorCode::InternalError => -32603,
            JsonRpcErrorCode::ServerError(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
        }
    }

    /// Classify a raw code; application-defined codes return `None`
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(JsonRpcErrorCode::ParseError),
            -32600 => Some(JsonRpcErrorCode::InvalidRequest),
            -32601 => Some(JsonRpcErrorCode::MethodNotFound),
            -32602 => Some(JsonRpcErrorCode::InvalidParams),
            -32603 => Some(JsonRpcErrorCode::InternalError),
            -32099..=-32000 => Some(JsonRpcErrorCode::ServerError(code)),
            _ => None,
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    /// Decode an error object from a response payload.
    ///
    /// Both JSON-RPC 2.0 and v1-style objects are accepted as long as `code`
    /// is an integer and `message` is a string; `data` is kept verbatim.
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        let object = value
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedError(format!("expected object, got {}", value)))?;

        let code = object
            .get("code")
            .ok_or_else(|| ProtocolError::MalformedError("missing code".to_string()))?
            .as_i64()
            .ok_or_else(|| ProtocolError::MalformedError("code is not an integer".to_string()))?;

        let message = object
            .get("message")
            .ok_or_else(|| ProtocolError::MalformedError("missing message".to_string()))?
            .as_str()
            .ok_or_else(|| ProtocolError::MalformedError("message is not a string".to_string()))?
            .to_string();

        Ok(Self {
            code,
            message,
            data: object.get("data").cloned(),
        })
    }

    pub fn method_not_found() -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, None, None)
    }

    pub fn invalid_request(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidRequest,
            Some(message.to_string()),
            None,
        )
    }

    pub fn server_error(code: i64, message: &str, data: Option<Value>) -> Self {
        Self::new(
            JsonRpcErrorCode::ServerError(code),
            Some(message.to_string()),
            data,
        )
    }
}
