//! Construction of outgoing requests and notifications

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::batch::BatchRequest;
use crate::config::ProtocolConfig;
use crate::error::{JsonRpcBaseError, JsonRpcBaseResult};
use crate::id::IdGenerator;
use crate::method::MethodPath;
use crate::notification::JsonRpcNotification;
use crate::pending::PendingRequestTable;
use crate::request::{JsonRpcRequest, OutgoingMessage, RequestParams};

/// Arguments supplied by the caller for one call
///
/// JSON-RPC params are either positional or named, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl Arguments {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            positional: args,
            named: Map::new(),
        }
    }

    pub fn named(kwargs: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            named: kwargs,
        }
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(args: Vec<Value>) -> Self {
        Self::positional(args)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(kwargs: Map<String, Value>) -> Self {
        Self::named(kwargs)
    }
}

/// Resolve caller arguments into the `params` member of a request.
///
/// A single positional argument that is itself an object becomes the named
/// params object. Empty arguments yield `None` so that `params` is left off
/// the wire entirely.
pub fn resolve_params(args: Arguments) -> JsonRpcBaseResult<Option<RequestParams>> {
    let Arguments {
        mut positional,
        named,
    } = args;

    match (positional.is_empty(), named.is_empty()) {
        (false, false) => Err(JsonRpcBaseError::invalid_arguments(
            "JSON-RPC forbids mixing positional and named arguments",
        )),
        (true, true) => Ok(None),
        (true, false) => Ok(Some(RequestParams::Object(named))),
        (false, true) => {
            if positional.len() == 1 && positional[0].is_object() {
                if let Some(Value::Object(map)) = positional.pop() {
                    return Ok(Some(RequestParams::Object(map)));
                }
            }
            Ok(Some(RequestParams::Array(positional)))
        }
    }
}

/// Builds requests, notifications and batches, registering every request id
/// in the shared [`PendingRequestTable`] before it is handed to the transport.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    config: ProtocolConfig,
    ids: IdGenerator,
    pending: Arc<PendingRequestTable>,
}

impl MessageBuilder {
    pub fn new(pending: Arc<PendingRequestTable>) -> Self {
        Self::with_config(pending, ProtocolConfig::default())
    }

    pub fn with_config(pending: Arc<PendingRequestTable>, config: ProtocolConfig) -> Self {
        Self {
            ids: IdGenerator::new(config.id_strategy),
            config,
            pending,
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn pending(&self) -> &Arc<PendingRequestTable> {
        &self.pending
    }

    /// Start a dotted method path, e.g. `builder.method("app").segment("users")`
    pub fn method(&self, segment: &str) -> MethodPath<'_> {
        MethodPath::new(self, segment)
    }

    /// Build a request or a notification
    pub fn build(
        &self,
        method: &str,
        args: Arguments,
        notification: bool,
    ) -> JsonRpcBaseResult<OutgoingMessage> {
        if notification {
            self.build_notification(method, args).map(OutgoingMessage::from)
        } else {
            self.build_request(method, args).map(OutgoingMessage::from)
        }
    }

    /// Build a request with a fresh id and register it as pending
    pub fn build_request(&self, method: &str, args: Arguments) -> JsonRpcBaseResult<JsonRpcRequest> {
        check_method(method)?;
        let params = resolve_params(args)?;

        let id = self.ids.generate();
        if !self.pending.register(id.clone(), method) {
            return Err(JsonRpcBaseError::DuplicateIdentifier(id));
        }

        debug!(method = method, id = %id, "Built JSON-RPC request");
        Ok(JsonRpcRequest::new(id, method.to_string(), params))
    }

    /// Build a notification; no id is generated or registered
    pub fn build_notification(
        &self,
        method: &str,
        args: Arguments,
    ) -> JsonRpcBaseResult<JsonRpcNotification> {
        check_method(method)?;
        let params = resolve_params(args)?;

        debug!(method = method, "Built JSON-RPC notification");
        Ok(JsonRpcNotification::new(method.to_string(), params))
    }

    /// Collect messages into a batch, enforcing the configured size limit
    pub fn build_batch(&self, messages: Vec<OutgoingMessage>) -> JsonRpcBaseResult<BatchRequest> {
        if let Some(max) = self.config.max_batch_size {
            if messages.len() > max {
                return Err(JsonRpcBaseError::invalid_arguments(format!(
                    "batch of {} messages exceeds the limit of {}",
                    messages.len(),
                    max
                )));
            }
        }

        let batch = BatchRequest::new(messages)?;
        debug!(size = batch.len(), "Built JSON-RPC batch");
        Ok(batch)
    }
}

fn check_method(method: &str) -> JsonRpcBaseResult<()> {
    if method.is_empty() {
        return Err(JsonRpcBaseError::invalid_arguments(
            "method name must not be empty",
        ));
    }
    Ok(())
}
