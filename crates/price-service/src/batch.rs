use std::sync::atomic::{AtomicU8, Ordering};

use dashmap::DashMap;

use crate::{error::ServiceError, id::BatchId, record::PriceRecord};

const ACTIVE: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

/// The lifecycle state of a [`Batch`].
///
/// Transitions are exactly `Active -> Completed` and `Active -> Cancelled`; there is no
/// path back out of either terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchState {
    Active,
    Completed,
    Cancelled,
}

impl BatchState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            ACTIVE => Self::Active,
            COMPLETED => Self::Completed,
            CANCELLED => Self::Cancelled,
            _ => unreachable!("batch state is only ever written as ACTIVE, COMPLETED or CANCELLED"),
        }
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A producer's staging area for one batch of prices.
///
/// Internal to the crate: [`crate::service::PriceService`] is the only mutator. `staged`
/// is an independently thread-safe map so concurrent `stage` calls against the same batch
/// are correct while the coordinator only holds its *shared* lock (see the crate's
/// concurrency notes); `state` is a single atomic word so the active check on the hot path
/// is a single load, not a read-then-write sequence.
pub(crate) struct Batch {
    id: BatchId,
    staged: DashMap<String, PriceRecord>,
    state: AtomicU8,
}

impl Batch {
    pub(crate) fn new(id: BatchId) -> Self {
        Self { id, staged: DashMap::new(), state: AtomicU8::new(ACTIVE) }
    }

    pub(crate) fn id(&self) -> &BatchId {
        &self.id
    }

    pub(crate) fn state(&self) -> BatchState {
        BatchState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stages `price`, applying the latest-as-of-wins rule against any existing entry for
    /// the same instrument. Fails if the batch is not `Active`.
    pub(crate) fn stage(&self, price: PriceRecord) -> Result<(), ServiceError> {
        if self.state() != BatchState::Active {
            return Err(ServiceError::illegal_state(format!(
                "batch {} is not active, cannot stage",
                self.id
            )));
        }

        let instrument_id = price.instrument_id().to_owned();
        self.staged
            .entry(instrument_id)
            .and_modify(|incumbent| {
                *incumbent = incumbent.clone().retain_latest(price.clone());
            })
            .or_insert(price);
        Ok(())
    }

    /// Transitions `Active -> Completed`. Fails with `IllegalState` if the batch is already
    /// terminal.
    pub(crate) fn mark_completed(&self) -> Result<(), ServiceError> {
        self.transition(COMPLETED)
    }

    /// Transitions `Active -> Cancelled`. Fails with `IllegalState` if the batch is already
    /// terminal.
    pub(crate) fn mark_cancelled(&self) -> Result<(), ServiceError> {
        self.transition(CANCELLED)
    }

    fn transition(&self, target: u8) -> Result<(), ServiceError> {
        self.state
            .compare_exchange(ACTIVE, target, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| {
                ServiceError::illegal_state(format!(
                    "batch {} is already {}",
                    self.id,
                    self.state()
                ))
            })
    }

    /// Snapshots the staged map for commit. Callers drain a batch exactly once, right
    /// before marking it `Completed`.
    pub(crate) fn drain(&self) -> Vec<PriceRecord> {
        self.staged.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(instrument: &str, millis: i64) -> PriceRecord {
        PriceRecord::new(instrument, millis, Default::default()).unwrap()
    }

    #[test]
    fn new_batch_is_active() {
        let batch = Batch::new(BatchId::generate());
        assert_eq!(batch.state(), BatchState::Active);
    }

    #[test]
    fn stage_applies_latest_as_of_wins() {
        let batch = Batch::new(BatchId::generate());
        batch.stage(price("AAPL", 10)).unwrap();
        batch.stage(price("AAPL", 20)).unwrap();
        batch.stage(price("AAPL", 15)).unwrap();

        let staged = batch.drain();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].as_of().millis(), 20);
    }

    #[test]
    fn stage_rejects_terminal_batch() {
        let batch = Batch::new(BatchId::generate());
        batch.mark_completed().unwrap();
        let err = batch.stage(price("AAPL", 10)).unwrap_err();
        assert!(matches!(err, ServiceError::IllegalState(_)));
    }

    #[test]
    fn mark_completed_then_cancelled_fails() {
        let batch = Batch::new(BatchId::generate());
        batch.mark_completed().unwrap();
        let err = batch.mark_cancelled().unwrap_err();
        assert!(matches!(err, ServiceError::IllegalState(_)));
    }

    #[test]
    fn re_marking_is_not_idempotent() {
        let batch = Batch::new(BatchId::generate());
        batch.mark_completed().unwrap();
        let err = batch.mark_completed().unwrap_err();
        assert!(matches!(err, ServiceError::IllegalState(_)));
    }

    #[test]
    fn id_round_trips() {
        let id = BatchId::generate();
        let batch = Batch::new(id.clone());
        assert_eq!(batch.id(), &id);
    }
}
