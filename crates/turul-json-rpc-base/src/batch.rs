use serde::Serialize;
use std::collections::HashSet;

use crate::error::{JsonRpcBaseError, JsonRpcBaseResult};
use crate::request::OutgoingMessage;
use crate::types::RequestId;

/// An ordered, non-empty collection of requests and notifications sent together.
///
/// Request ids within one batch are pairwise distinct. Insertion order is kept
/// so callers can correlate responses that arrive out of order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchRequest {
    messages: Vec<OutgoingMessage>,
}

impl BatchRequest {
    pub fn new(messages: Vec<OutgoingMessage>) -> JsonRpcBaseResult<Self> {
        if messages.is_empty() {
            return Err(JsonRpcBaseError::EmptyBatch);
        }

        let mut seen = HashSet::new();
        for id in messages.iter().filter_map(OutgoingMessage::id) {
            if !seen.insert(id) {
                return Err(JsonRpcBaseError::DuplicateIdentifier(id.clone()));
            }
        }

        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true for a batch built through [`BatchRequest::new`]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutgoingMessage> {
        self.messages.iter()
    }

    /// Ids of the requests in insertion order; notifications are skipped
    pub fn request_ids(&self) -> Vec<RequestId> {
        self.messages
            .iter()
            .filter_map(OutgoingMessage::id)
            .cloned()
            .collect()
    }

    pub fn into_inner(self) -> Vec<OutgoingMessage> {
        self.messages
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl<'a> IntoIterator for &'a BatchRequest {
    type Item = &'a OutgoingMessage;
    type IntoIter = std::slice::Iter<'a, OutgoingMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
