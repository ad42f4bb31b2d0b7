use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcErrorObject;
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Value,
    pub id: RequestId,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result,
            id,
        }
    }
}

/// A JSON-RPC error response; `id` is `null` when the request could not be identified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: JsonRpcErrorObject,
    pub id: Option<RequestId>,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error,
            id,
        }
    }
}

/// Either a successful response or an error response, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Successful response with result field
    Response(JsonRpcResponse),
    /// Error response with error field
    Error(JsonRpcErrorResponse),
}

impl JsonRpcMessage {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Response(JsonRpcResponse::success(id, result))
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self::Error(JsonRpcErrorResponse::new(id, error))
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    /// Get the request ID from either response or error
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Response(resp) => Some(&resp.id),
            JsonRpcMessage::Error(err) => err.id.as_ref(),
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcErrorResponse> for JsonRpcMessage {
    fn from(error: JsonRpcErrorResponse) -> Self {
        Self::Error(error)
    }
}
