use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::notification::JsonRpcNotification;
use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl RequestParams {
    /// Interpret a decoded `params` value; only arrays and objects are structured values
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(vec) => Some(RequestParams::Array(vec)),
            Value::Object(map) => Some(RequestParams::Object(map)),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, RequestParams::Object(_))
    }

    /// Convert to a serde_json::Value for serialization
    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Object(map) => Value::Object(map.clone()),
            RequestParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Array(vec)
    }
}

/// A JSON-RPC request that expects a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: String, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
            id,
        }
    }

    /// Create a new request with no parameters
    pub fn new_no_params(id: RequestId, method: String) -> Self {
        Self::new(id, method, None)
    }
}

/// Anything that can be put on the wire as one element of a call or batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

impl OutgoingMessage {
    pub fn method(&self) -> &str {
        match self {
            OutgoingMessage::Request(request) => &request.method,
            OutgoingMessage::Notification(notification) => &notification.method,
        }
    }

    pub fn params(&self) -> Option<&RequestParams> {
        match self {
            OutgoingMessage::Request(request) => request.params.as_ref(),
            OutgoingMessage::Notification(notification) => notification.params.as_ref(),
        }
    }

    /// The correlation id, or `None` for notifications
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            OutgoingMessage::Request(request) => Some(&request.id),
            OutgoingMessage::Notification(_) => None,
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, OutgoingMessage::Notification(_))
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl From<JsonRpcRequest> for OutgoingMessage {
    fn from(request: JsonRpcRequest) -> Self {
        Self::Request(request)
    }
}

impl From<JsonRpcNotification> for OutgoingMessage {
    fn from(notification: JsonRpcNotification) -> Self {
        Self::Notification(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string, to_value};

    #[test]
    fn test_request_serialization() {
        let request =
            JsonRpcRequest::new_no_params(RequestId::Number(1), "test_method".to_string());

        let json = to_string(&request).unwrap();
        assert!(!json.contains("params"));
        let parsed: JsonRpcRequest = from_str(&json).unwrap();

        assert_eq!(parsed.id, RequestId::Number(1));
        assert_eq!(parsed.method, "test_method");
        assert!(parsed.params.is_none());
    }

    #[test]
    fn test_request_wire_format() {
        let mut params = Map::new();
        params.insert("foo".to_string(), json!("bar"));
        let request = JsonRpcRequest::new(
            RequestId::Number(1),
            "my_method_name".to_string(),
            Some(params.into()),
        );

        assert_eq!(
            to_value(&request).unwrap(),
            json!({"jsonrpc": "2.0", "method": "my_method_name", "params": {"foo": "bar"}, "id": 1})
        );
    }

    #[test]
    fn test_request_with_array_params() {
        let request = JsonRpcRequest::new(
            RequestId::Number(2),
            "process".to_string(),
            Some(vec![json!("test"), json!(42), json!(true)].into()),
        );

        let params = request.params.as_ref().unwrap();
        assert!(!params.is_object());
        assert_eq!(params.to_value(), json!(["test", 42, true]));
    }

    #[test]
    fn test_params_from_value() {
        assert!(RequestParams::from_value(json!([1])).is_some());
        assert!(RequestParams::from_value(json!({"a": 1})).unwrap().is_object());
        assert!(RequestParams::from_value(json!("string_params")).is_none());
        assert!(RequestParams::from_value(json!(null)).is_none());
    }

    #[test]
    fn test_outgoing_message_is_untagged() {
        let request: OutgoingMessage =
            JsonRpcRequest::new_no_params(RequestId::Bool(false), "a".to_string()).into();
        let notification: OutgoingMessage = JsonRpcNotification::new_no_params("b".to_string()).into();

        assert_eq!(
            request.to_value().unwrap(),
            json!({"jsonrpc": "2.0", "method": "a", "id": false})
        );
        assert_eq!(
            notification.to_value().unwrap(),
            json!({"jsonrpc": "2.0", "method": "b"})
        );
        assert_eq!(request.id(), Some(&RequestId::Bool(false)));
        assert!(notification.id().is_none());
    }
}
