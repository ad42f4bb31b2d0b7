use serde::{Deserialize, Serialize};

use crate::{request::RequestParams, types::JsonRpcVersion};

/// A one-way message: it has no `id` field, is never registered as pending
/// and never receives a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<RequestParams>,
}

impl JsonRpcNotification {
    pub fn new(method: String, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
        }
    }

    pub fn new_no_params(method: String) -> Self {
        Self::new(method, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn test_bare_notification_wire_format() {
        let notification = JsonRpcNotification::new_no_params("heartbeat".to_string());

        assert_eq!(
            to_value(&notification).unwrap(),
            json!({"jsonrpc": "2.0", "method": "heartbeat"})
        );
    }

    #[test]
    fn test_notification_never_has_an_id() {
        let notification = JsonRpcNotification::new(
            "my_method_name".to_string(),
            Some(vec![json!("foo"), json!("bar")].into()),
        );
        let value = to_value(&notification).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["params"], json!(["foo", "bar"]));
    }

    #[test]
    fn test_notification_rejects_other_versions() {
        let parsed = serde_json::from_value::<JsonRpcNotification>(
            json!({"jsonrpc": "1.0", "method": "heartbeat"}),
        );
        assert!(parsed.is_err());
    }
}
