//! Correlation identifier generation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::RequestId;

/// Shape of the identifiers handed out by [`IdGenerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random 128-bit UUID rendered as a hyphenated string
    #[default]
    Uuid,
    /// Random positive integer, for servers that reject string ids
    RandomInteger,
}

/// Produces identifiers that are unique among all identifiers issued by the process.
///
/// Identifiers are random rather than sequential so that concurrent batches and
/// reconnecting sessions never collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator {
    strategy: IdStrategy,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    pub fn generate(&self) -> RequestId {
        match self.strategy {
            IdStrategy::Uuid => RequestId::String(Uuid::new_v4().to_string()),
            IdStrategy::RandomInteger => {
                // 1..=i64::MAX
                let raw = rand::random::<u64>() >> 1;
                RequestId::Number(raw.max(1) as i64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_unique() {
        let generator = IdGenerator::default();
        let ids: HashSet<RequestId> = (0..10_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_uuid_id_format() {
        let id = IdGenerator::new(IdStrategy::Uuid).generate();
        let text = id.as_str().expect("uuid ids are strings");
        assert_eq!(text.len(), 36);
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn test_random_integer_ids_are_positive() {
        let generator = IdGenerator::new(IdStrategy::RandomInteger);
        for _ in 0..1_000 {
            let n = generator.generate().as_i64().expect("integer ids");
            assert!(n >= 1);
        }
    }
}
