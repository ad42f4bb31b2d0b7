//! Validation of decoded response payloads against the pending request table

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::batch::BatchRequest;
use crate::config::ProtocolConfig;
use crate::error::{
    ApplicationError, JsonRpcBaseError, JsonRpcBaseResult, JsonRpcErrorObject, ProtocolError,
};
use crate::pending::PendingRequestTable;
use crate::request::OutgoingMessage;
use crate::types::RequestId;

/// Validate a single response with the default configuration
pub fn validate_response(payload: &Value, pending: &PendingRequestTable) -> JsonRpcBaseResult<Value> {
    ResponseValidator::new(pending).validate(payload)
}

/// Validate a batch response with the default configuration
pub fn validate_batch_response(
    payload: &Value,
    pending: &PendingRequestTable,
) -> JsonRpcBaseResult<BatchResponse> {
    ResponseValidator::new(pending).validate_batch(payload)
}

/// One response that passed protocol validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    /// `None` only for error responses the server could not correlate
    pub id: Option<RequestId>,
    pub outcome: Result<Value, ApplicationError>,
}

impl ValidatedResponse {
    pub fn into_result(self) -> JsonRpcBaseResult<Value> {
        self.outcome.map_err(JsonRpcBaseError::from)
    }
}

/// A batch element that failed protocol validation
#[derive(Debug, Clone, PartialEq)]
pub struct BatchViolation {
    /// The element's id, if it carried a readable one
    pub id: Option<RequestId>,
    pub error: ProtocolError,
}

/// Outcomes of a batch response, keyed by request id regardless of arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    pub outcomes: HashMap<RequestId, Result<Value, ApplicationError>>,
    /// Errors reported with a `null` id (e.g. a request the server could not parse)
    pub uncorrelated: Vec<ApplicationError>,
    /// Elements rejected on their own; their siblings are unaffected
    pub violations: Vec<BatchViolation>,
}

impl BatchResponse {
    pub fn get(&self, id: &RequestId) -> Option<&Result<Value, ApplicationError>> {
        self.outcomes.get(id)
    }

    /// Remove one outcome, converting it to the crate result type
    pub fn take(&mut self, id: &RequestId) -> Option<JsonRpcBaseResult<Value>> {
        self.outcomes
            .remove(id)
            .map(|outcome| outcome.map_err(JsonRpcBaseError::from))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() && self.uncorrelated.is_empty() && self.violations.is_empty()
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// The protocol failure recorded for `id`, if any
    pub fn violation(&self, id: &RequestId) -> Option<&ProtocolError> {
        self.violations
            .iter()
            .find(|violation| violation.id.as_ref() == Some(id))
            .map(|violation| &violation.error)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &Result<Value, ApplicationError>)> {
        self.outcomes.iter()
    }

    /// Requests of `batch` that received neither an outcome nor a rejected
    /// element, in batch order
    pub fn unanswered(&self, batch: &BatchRequest) -> Vec<RequestId> {
        batch
            .request_ids()
            .into_iter()
            .filter(|id| !self.outcomes.contains_key(id) && self.violation(id).is_none())
            .collect()
    }
}

/// Ids a response may carry
#[derive(Debug, Clone, Copy)]
enum Expected<'e> {
    Any,
    One(&'e RequestId),
    Among(&'e HashSet<RequestId>),
}

impl Expected<'_> {
    fn admits(&self, id: &RequestId) -> bool {
        match self {
            Expected::Any => true,
            Expected::One(expected) => *expected == id,
            Expected::Among(ids) => ids.contains(id),
        }
    }
}

/// Checks decoded responses and claims their ids from the pending table.
///
/// A claimed id is removed, so a duplicated or stale delivery of the same
/// response is reported as [`ProtocolError::UnexpectedId`].
#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator<'a> {
    pending: &'a PendingRequestTable,
    accept_v1_responses: bool,
}

impl<'a> ResponseValidator<'a> {
    pub fn new(pending: &'a PendingRequestTable) -> Self {
        Self::with_config(pending, &ProtocolConfig::default())
    }

    pub fn with_config(pending: &'a PendingRequestTable, config: &ProtocolConfig) -> Self {
        Self {
            pending,
            accept_v1_responses: config.accept_v1_responses,
        }
    }

    /// Validate a single response, returning its result or the server's error
    pub fn validate(&self, payload: &Value) -> JsonRpcBaseResult<Value> {
        self.validate_entry(payload)?.into_result()
    }

    /// Validate a single response without collapsing the outcome
    pub fn validate_entry(&self, payload: &Value) -> Result<ValidatedResponse, ProtocolError> {
        self.checked(payload, Expected::Any)
    }

    /// Validate the response to one specific message.
    ///
    /// Notifications never match a response, so `Ok(None)` is returned without
    /// looking at the payload. For requests the response id must equal the
    /// request id.
    pub fn validate_for(
        &self,
        message: &OutgoingMessage,
        payload: &Value,
    ) -> JsonRpcBaseResult<Option<Value>> {
        match message.id() {
            None => Ok(None),
            Some(expected) => self
                .checked(payload, Expected::One(expected))?
                .into_result()
                .map(Some),
        }
    }

    /// Validate a batch response.
    ///
    /// Every element is validated on its own. An element that breaks the
    /// protocol is recorded in [`BatchResponse::violations`] and does not
    /// affect its siblings.
    pub fn validate_batch(&self, payload: &Value) -> JsonRpcBaseResult<BatchResponse> {
        self.decode_batch(payload, Expected::Any)
    }

    /// Validate the response to one specific batch.
    ///
    /// Elements whose id does not belong to `batch` are rejected with
    /// [`ProtocolError::UnexpectedId`] without touching the pending table.
    pub fn validate_batch_for(
        &self,
        batch: &BatchRequest,
        payload: &Value,
    ) -> JsonRpcBaseResult<BatchResponse> {
        let ids: HashSet<RequestId> = batch.request_ids().into_iter().collect();
        self.decode_batch(payload, Expected::Among(&ids))
    }

    fn decode_batch(
        &self,
        payload: &Value,
        expected: Expected<'_>,
    ) -> JsonRpcBaseResult<BatchResponse> {
        let entries = match payload {
            Value::Array(entries) => entries,
            Value::Object(object) if is_unidentified_error(object) => {
                // The server rejected the batch as a whole
                return match self.checked(payload, expected)?.outcome {
                    Err(error) => Err(error.into()),
                    Ok(_) => Err(ProtocolError::NotABatch.into()),
                };
            }
            _ => {
                warn!("Rejected JSON-RPC batch response: not an array");
                return Err(ProtocolError::NotABatch.into());
            }
        };

        if entries.is_empty() {
            warn!("Rejected JSON-RPC batch response: empty array");
            return Err(ProtocolError::EmptyBatchResponse.into());
        }

        let mut batch = BatchResponse::default();
        for entry in entries {
            match self.checked(entry, expected) {
                Ok(ValidatedResponse { id: Some(id), outcome }) => {
                    batch.outcomes.insert(id, outcome);
                }
                Ok(ValidatedResponse { id: None, outcome }) => {
                    if let Err(error) = outcome {
                        batch.uncorrelated.push(error);
                    }
                }
                Err(error) => batch.violations.push(BatchViolation {
                    id: entry.get("id").and_then(RequestId::from_value),
                    error,
                }),
            }
        }

        debug!(
            matched = batch.outcomes.len(),
            uncorrelated = batch.uncorrelated.len(),
            violations = batch.violations.len(),
            "Validated JSON-RPC batch response"
        );
        Ok(batch)
    }

    fn checked(
        &self,
        payload: &Value,
        expected: Expected<'_>,
    ) -> Result<ValidatedResponse, ProtocolError> {
        self.decode(payload, expected)
            .inspect_err(|error| warn!(error = %error, "Rejected JSON-RPC response"))
    }

    fn decode(
        &self,
        payload: &Value,
        expected: Expected<'_>,
    ) -> Result<ValidatedResponse, ProtocolError> {
        let object = payload.as_object().ok_or(ProtocolError::NotAnObject)?;

        let v1 = match object.get("jsonrpc") {
            None if self.accept_v1_responses => true,
            None => return Err(ProtocolError::MissingVersion),
            Some(Value::String(version)) if version == crate::JSONRPC_VERSION => false,
            Some(Value::String(version)) => {
                return Err(ProtocolError::UnsupportedVersion(version.clone()));
            }
            Some(other) => return Err(ProtocolError::UnsupportedVersion(other.to_string())),
        };

        let mut result = object.get("result");
        let mut error = object.get("error");
        if v1 {
            // JSON-RPC 1.0 servers send both members and null out the unused one
            if error.is_some_and(Value::is_null) {
                error = None;
            } else if error.is_some() && result.is_some_and(Value::is_null) {
                result = None;
            }
        }

        let id = match object.get("id") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                RequestId::from_value(raw).ok_or_else(|| ProtocolError::InvalidId(raw.clone()))?,
            ),
        };

        if let Some(id) = &id {
            if !expected.admits(id) {
                return Err(ProtocolError::UnexpectedId(id.clone()));
            }
        }

        match (result, error) {
            (None, None) => Err(ProtocolError::MissingResultAndError),
            (Some(_), Some(_)) => Err(ProtocolError::BothResultAndError),
            (Some(result), None) => {
                let id = id.ok_or(ProtocolError::MissingId)?;
                self.claim(&id)?;
                Ok(ValidatedResponse {
                    id: Some(id),
                    outcome: Ok(result.clone()),
                })
            }
            (None, Some(error)) => {
                if let Some(id) = &id {
                    self.claim(id)?;
                }
                let error = JsonRpcErrorObject::from_value(error)?;
                debug!(code = error.code, "Server reported JSON-RPC error");
                Ok(ValidatedResponse {
                    id,
                    outcome: Err(error.into()),
                })
            }
        }
    }

    fn claim(&self, id: &RequestId) -> Result<(), ProtocolError> {
        match self.pending.take(id) {
            Some(entry) => {
                debug!(id = %id, method = %entry.method, "Matched JSON-RPC response");
                Ok(())
            }
            None => Err(ProtocolError::UnexpectedId(id.clone())),
        }
    }
}

fn is_unidentified_error(object: &Map<String, Value>) -> bool {
    object.contains_key("error") && object.get("id").is_none_or(Value::is_null)
}
