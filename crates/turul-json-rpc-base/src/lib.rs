//! # JSON-RPC 2.0 Client Message Layer
//!
//! A transport-agnostic JSON-RPC 2.0 core for client backends. It builds
//! requests, notifications and batches, tracks the ids of requests awaiting a
//! response, and validates decoded responses into a result or a typed error.
//! Byte-level I/O, retries and scheduling belong to the transport that embeds it.
//!
//! ## Features
//! - Request and notification construction with positional or named params
//! - Random correlation ids registered in a shared [`PendingRequestTable`]
//! - Batches with duplicate-id detection
//! - Dotted method paths (`app.users.getUsers`)
//! - Response validation for single and batch payloads, tolerant of
//!   JSON-RPC 1.0 servers that omit the version field
//! - Handling of requests initiated by the server
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use turul_json_rpc_base::prelude::*;
//!
//! let pending = Arc::new(PendingRequestTable::new());
//! let builder = MessageBuilder::new(pending.clone());
//!
//! let request = builder
//!     .method("app")
//!     .segment("users")
//!     .segment("getUsers")
//!     .request(Arguments::none())
//!     .unwrap();
//! assert_eq!(request.method, "app.users.getUsers");
//!
//! let response = json!({"jsonrpc": "2.0", "result": 0, "id": request.id});
//! assert_eq!(validate_response(&response, &pending).unwrap(), json!(0));
//! ```

pub mod batch;
pub mod builder;
pub mod config;
pub mod error;
pub mod id;
pub mod method;
pub mod notification;
pub mod pending;
pub mod request;
pub mod response;
pub mod server_requests;
pub mod types;
pub mod validator;

pub mod prelude;

// Re-export main types
pub use batch::BatchRequest;
pub use builder::{Arguments, MessageBuilder, resolve_params};
pub use config::ProtocolConfig;
pub use error::{
    ApplicationError, JsonRpcBaseError, JsonRpcBaseResult, JsonRpcErrorCode, JsonRpcErrorObject,
    ProtocolError,
};
pub use id::{IdGenerator, IdStrategy};
pub use method::{MethodPath, resolve_nested_method};
pub use notification::JsonRpcNotification;
pub use pending::{PendingRequest, PendingRequestTable};
pub use request::{JsonRpcRequest, OutgoingMessage, RequestParams};
pub use response::{JsonRpcErrorResponse, JsonRpcMessage, JsonRpcResponse};
pub use server_requests::{HandlerError, JsonRpcIncomingRequest, ServerRequestHandlers};
pub use types::{JsonRpcVersion, RequestId};
pub use validator::{
    BatchResponse, BatchViolation, ResponseValidator, ValidatedResponse, validate_batch_response,
    validate_response,
};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
