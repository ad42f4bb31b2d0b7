//! Configuration types for the message layer

use serde::{Deserialize, Serialize};

use crate::id::IdStrategy;

/// Protocol behaviour shared by the builders and the response validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// How correlation identifiers are generated
    pub id_strategy: IdStrategy,

    /// Accept responses that omit the `jsonrpc` version field (JSON-RPC 1.0 servers)
    pub accept_v1_responses: bool,

    /// Upper bound on the number of messages in one batch
    pub max_batch_size: Option<usize>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            accept_v1_responses: true,
            max_batch_size: None,
        }
    }
}

impl ProtocolConfig {
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn with_v1_responses(mut self, accept: bool) -> Self {
        self.accept_v1_responses = accept;
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }
}
