//! Table of requests awaiting a response

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::types::RequestId;

/// Caller context recorded for a request that has been sent but not answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub method: String,
}

/// Identifiers of requests that are still waiting for a response.
///
/// Owned by the transport and shared with the builders and the validator.
/// Every operation takes the lock once, so `take` is an atomic
/// lookup-and-remove and a response can never be matched twice.
#[derive(Debug, Default)]
pub struct PendingRequestTable {
    entries: Mutex<HashMap<RequestId, PendingRequest>>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending request. Returns `false` if the id is already pending.
    pub fn register(&self, id: RequestId, method: impl Into<String>) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(
            id,
            PendingRequest {
                method: method.into(),
            },
        );
        true
    }

    /// Remove and return the entry for `id`, if it is pending
    pub fn take(&self, id: &RequestId) -> Option<PendingRequest> {
        self.entries.lock().remove(id)
    }

    /// Drop a request the caller stopped waiting for (timeout, cancellation)
    pub fn abandon(&self, id: &RequestId) -> bool {
        let removed = self.entries.lock().remove(id).is_some();
        if removed {
            debug!(id = %id, "Abandoned pending request");
        }
        removed
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn method_of(&self, id: &RequestId) -> Option<String> {
        self.entries.lock().get(id).map(|entry| entry.method.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget every pending request, e.g. when the connection is torn down
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_and_take() {
        let table = PendingRequestTable::new();
        assert!(table.register(RequestId::Number(0), "ping"));
        assert!(!table.register(RequestId::Number(0), "ping"));
        assert_eq!(table.len(), 1);

        let entry = table.take(&RequestId::Number(0)).unwrap();
        assert_eq!(entry.method, "ping");
        assert!(table.take(&RequestId::Number(0)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_falsy_ids_do_not_alias() {
        let table = PendingRequestTable::new();
        table.register(RequestId::Number(0), "a");
        table.register(RequestId::String(String::new()), "b");
        table.register(RequestId::Bool(false), "c");
        assert_eq!(table.len(), 3);
        assert_eq!(table.method_of(&RequestId::Bool(false)).as_deref(), Some("c"));
    }

    #[test]
    fn test_abandon() {
        let table = PendingRequestTable::new();
        table.register("req".into(), "slow");
        assert!(table.abandon(&"req".into()));
        assert!(!table.abandon(&"req".into()));
        assert!(!table.contains(&"req".into()));
    }

    #[test]
    fn test_concurrent_take_matches_once() {
        let table = Arc::new(PendingRequestTable::new());
        table.register(RequestId::Number(7), "once");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || table.take(&RequestId::Number(7)).is_some())
            })
            .collect();

        let matched = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|matched| *matched)
            .count();
        assert_eq!(matched, 1);
    }
}
