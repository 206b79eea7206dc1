use std::{borrow::Borrow, fmt};

use rand::Rng;

/// A globally unique, opaque batch identifier.
///
/// Generated by the service at batch creation as a random 128-bit value rendered as hex
/// text — practically unique without coordination, per the governing spec's identifier
/// generation note. The coordinator still guards against collision defensively (see
/// [`crate::service::PriceService::start_batch`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(String);

impl BatchId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        let bits: u128 = rand::thread_rng().gen();
        Self(format!("{bits:032x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BatchId> for String {
    fn from(id: BatchId) -> Self {
        id.0
    }
}

/// Lets the coordinator's `HashMap<BatchId, Batch>` be looked up by a plain `&str`
/// (the batch id a caller actually holds) without allocating a `BatchId` just to query it.
impl Borrow<str> for BatchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
