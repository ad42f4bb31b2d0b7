//! Dotted method paths for namespaced services (`app.users.getUsers`)

use crate::builder::{Arguments, MessageBuilder};
use crate::error::{JsonRpcBaseError, JsonRpcBaseResult};
use crate::notification::JsonRpcNotification;
use crate::request::JsonRpcRequest;

/// Join path segments into a single dotted method name.
///
/// Segments must be non-empty; whether the method exists is up to the server.
pub fn resolve_nested_method(segments: &[&str]) -> JsonRpcBaseResult<String> {
    if segments.is_empty() {
        return Err(JsonRpcBaseError::invalid_arguments(
            "method path needs at least one segment",
        ));
    }
    if let Some(position) = segments.iter().position(|segment| segment.is_empty()) {
        return Err(JsonRpcBaseError::invalid_arguments(format!(
            "method path segment {} is empty",
            position
        )));
    }
    Ok(segments.join("."))
}

/// A method name under construction, bound to the builder that will issue it.
///
/// Each [`segment`](Self::segment) call returns a new path; [`request`](Self::request)
/// and [`notify`](Self::notify) hand the full dotted name to the builder.
#[derive(Debug, Clone)]
pub struct MethodPath<'a> {
    builder: &'a MessageBuilder,
    segments: Vec<String>,
}

impl<'a> MethodPath<'a> {
    pub fn new(builder: &'a MessageBuilder, segment: &str) -> Self {
        Self {
            builder,
            segments: vec![segment.to_string()],
        }
    }

    pub fn segment(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            builder: self.builder,
            segments,
        }
    }

    /// The dotted method name accumulated so far
    pub fn path(&self) -> JsonRpcBaseResult<String> {
        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        resolve_nested_method(&segments)
    }

    pub fn request(&self, args: Arguments) -> JsonRpcBaseResult<JsonRpcRequest> {
        self.builder.build_request(&self.path()?, args)
    }

    pub fn notify(&self, args: Arguments) -> JsonRpcBaseResult<JsonRpcNotification> {
        self.builder.build_notification(&self.path()?, args)
    }
}
