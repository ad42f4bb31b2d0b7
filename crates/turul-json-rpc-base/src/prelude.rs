//! # JSON-RPC Base Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the JSON-RPC message layer.
//!
//! ```rust
//! use turul_json_rpc_base::prelude::*;
//! ```

// Builders
pub use crate::batch::BatchRequest;
pub use crate::builder::{Arguments, MessageBuilder};
pub use crate::method::{MethodPath, resolve_nested_method};

// Core JSON-RPC types
pub use crate::config::ProtocolConfig;
pub use crate::id::IdStrategy;
pub use crate::notification::JsonRpcNotification;
pub use crate::pending::PendingRequestTable;
pub use crate::request::{JsonRpcRequest, OutgoingMessage, RequestParams};
pub use crate::response::JsonRpcMessage;
pub use crate::types::{JsonRpcVersion, RequestId};

// Validation and errors
pub use crate::error::{ApplicationError, JsonRpcBaseError, JsonRpcBaseResult, ProtocolError};
pub use crate::server_requests::{HandlerError, ServerRequestHandlers};
pub use crate::validator::{
    BatchResponse, BatchViolation, ResponseValidator, validate_batch_response, validate_response,
};

// Standard error codes
pub use crate::error_codes::*;
