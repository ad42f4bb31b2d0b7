use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A correlation identifier for a JSON-RPC request.
///
/// Falsy values (`0`, `""`, `false`) are ordinary identifiers. Absence is
/// always expressed as `Option<RequestId>`, never as a sentinel value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Bool(bool),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{:?}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<bool> for RequestId {
    fn from(b: bool) -> Self {
        RequestId::Bool(b)
    }
}

impl From<RequestId> for Value {
    fn from(id: RequestId) -> Self {
        match id {
            RequestId::String(s) => Value::String(s),
            RequestId::Number(n) => Value::from(n),
            RequestId::Bool(b) => Value::Bool(b),
        }
    }
}

impl RequestId {
    /// Convert a decoded JSON value into an identifier.
    ///
    /// Returns `None` for values that cannot identify a request: `null`,
    /// floats, integers outside `i64`, arrays and objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => n.as_i64().map(RequestId::Number),
            Value::Bool(b) => Some(RequestId::Bool(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RequestId::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            crate::JSONRPC_VERSION => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}
