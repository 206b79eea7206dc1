use std::{cmp::Ordering, collections::HashMap};

use serde_json::Value;

use crate::error::ServiceError;

/// The logical effective time of a price observation.
///
/// Wraps a plain integer (e.g. epoch millis) rather than re-exporting a third-party clock
/// type: the core only needs a strict total order with an "is after" comparison, not a
/// calendar or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsOf(i64);

impl AsOf {
    #[must_use]
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub fn is_after(self, other: AsOf) -> bool {
        self > other
    }

    #[must_use]
    pub fn millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for AsOf {
    fn from(millis: i64) -> Self {
        Self::new(millis)
    }
}

impl std::fmt::Display for AsOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque bag of fields the core neither inspects nor constrains; treated as a value for
/// equality and cloning, never parsed.
pub type Payload = HashMap<String, Value>;

/// An immutable carrier for one price observation.
///
/// Fields are set at construction and never mutated; producing an "updated" price means
/// constructing a new `PriceRecord`, never mutating one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    instrument_id: String,
    as_of: AsOf,
    payload: Payload,
}

impl PriceRecord {
    /// Constructs a new record, rejecting an empty instrument id.
    ///
    /// The source spec also rejects a "missing" timestamp, which collapses into a no-op
    /// here: `AsOf` is not an `Option`, so the type system already rules out that half of
    /// the original check for an owned, non-optional argument.
    pub fn new(
        instrument_id: impl Into<String>,
        as_of: impl Into<AsOf>,
        payload: Payload,
    ) -> Result<Self, ServiceError> {
        let instrument_id = instrument_id.into();
        if instrument_id.is_empty() {
            return Err(ServiceError::invalid_argument(
                "price record requires a non-empty instrument id",
            ));
        }

        Ok(Self { instrument_id, as_of: as_of.into(), payload })
    }

    #[must_use]
    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    #[must_use]
    pub fn as_of(&self) -> AsOf {
        self.as_of
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Applies the latest-as-of-wins tie-break: `self` is the incumbent, `candidate` is the
    /// newly observed price for the same instrument. Returns whichever should be retained.
    ///
    /// Strictly later `as_of` wins; on a tie the incumbent (`self`) is retained, matching
    /// the "new does not displace equal" contract (§4.2/§4.3 of the governing spec).
    #[must_use]
    pub fn retain_latest(self, candidate: PriceRecord) -> PriceRecord {
        match candidate.as_of.cmp(&self.as_of) {
            Ordering::Greater => candidate,
            Ordering::Less | Ordering::Equal => self,
        }
    }
}

impl std::fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} {}",
            self.instrument_id,
            self.as_of,
            price_service_utils::formatting::format_map(self.payload.iter())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(instrument: &str, millis: i64) -> PriceRecord {
        PriceRecord::new(instrument, millis, Payload::new()).unwrap()
    }

    #[test]
    fn rejects_empty_instrument_id() {
        let err = PriceRecord::new("", 10, Payload::new()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn retain_latest_prefers_strictly_later() {
        let incumbent = price("AAPL", 10);
        let candidate = price("AAPL", 20);
        let winner = incumbent.retain_latest(candidate.clone());
        assert_eq!(winner, candidate);
    }

    #[test]
    fn retain_latest_keeps_incumbent_on_tie() {
        let incumbent = price("AAPL", 10);
        let candidate = price("AAPL", 10);
        let winner = incumbent.clone().retain_latest(candidate);
        assert_eq!(winner, incumbent);
    }

    #[test]
    fn retain_latest_rejects_earlier_candidate() {
        let incumbent = price("AAPL", 20);
        let candidate = price("AAPL", 10);
        let winner = incumbent.clone().retain_latest(candidate);
        assert_eq!(winner, incumbent);
    }
}
