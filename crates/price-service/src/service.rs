use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{info, instrument};

use crate::{
    batch::{Batch, BatchState},
    error::ServiceError,
    id::BatchId,
    record::PriceRecord,
    COMPONENT,
};

/// State jointly guarded by the coordinator's reader-writer lock: the set of known batches
/// and the global latest-price table.
///
/// Grouped into one struct so a single `RwLock` enforces the shared-resource policy: an
/// exclusive (write) guard sees a quiescent set of batches, which is what lets
/// [`PriceService::complete_batch`] and [`PriceService::cancel_batch`] guarantee atomicity
/// without a second lock.
#[derive(Default)]
struct Inner {
    batches: HashMap<BatchId, Batch>,
    latest: HashMap<String, PriceRecord>,
}

/// The in-memory, concurrent latest-price coordinator.
///
/// Owns every batch and the global latest-price table, and is the sole mutator of both.
/// All public operations are synchronous: nothing here ever awaits I/O, so a single
/// `PriceService` may be shared (typically behind an `Arc`) across any number of producer
/// and reader threads.
#[derive(Default)]
pub struct PriceService {
    inner: RwLock<Inner>,
}

impl PriceService {
    /// Builds an empty service: no batches, no latest prices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new `Active` batch and returns its id.
    ///
    /// There is no "only one active batch" restriction: arbitrarily many batches may be
    /// open concurrently, from any number of producers.
    #[instrument(target = COMPONENT, skip(self))]
    pub fn start_batch(&self) -> Result<BatchId, ServiceError> {
        let mut inner = self.inner.write();
        let id = BatchId::generate();
        if inner.batches.contains_key(&id) {
            return Err(ServiceError::illegal_state(format!("batch id collision: {id}")));
        }
        inner.batches.insert(id.clone(), Batch::new(id.clone()));
        info!(batch_id = %id, "started batch");
        Ok(id)
    }

    /// Stages `price` into `batch_id` under the latest-as-of-wins rule.
    ///
    /// Runs under the coordinator's *shared* lock: many producers may call this
    /// concurrently, against the same batch or different ones, without serializing on each
    /// other here.
    #[instrument(target = COMPONENT, skip(self, price), fields(instrument_id = price.instrument_id()))]
    pub fn upload_price(&self, batch_id: &str, price: PriceRecord) -> Result<(), ServiceError> {
        if batch_id.is_empty() {
            return Err(ServiceError::invalid_argument("batch id must not be empty"));
        }

        let inner = self.inner.read();
        let batch = inner
            .batches
            .get(batch_id)
            .ok_or_else(|| ServiceError::illegal_state(format!("unknown batch {batch_id}")))?;
        batch.stage(price)
    }

    /// Convenience wrapper over [`Self::upload_price`] for a sequence of prices.
    ///
    /// Not atomic across the sequence: a mid-list failure leaves the earlier prices
    /// staged. Recovery (cancel and restart the batch) is the caller's responsibility.
    pub fn upload_prices(
        &self,
        batch_id: &str,
        prices: impl IntoIterator<Item = PriceRecord>,
    ) -> Result<(), ServiceError> {
        for price in prices {
            self.upload_price(batch_id, price)?;
        }
        Ok(())
    }

    /// Atomically merges `batch_id`'s staged prices into the latest-price table and
    /// transitions the batch to `Completed`.
    ///
    /// Acquires the coordinator's *exclusive* lock for the duration of the merge: no
    /// reader observes a state in which some but not all of this batch's eligible
    /// instruments have been updated.
    #[instrument(target = COMPONENT, skip(self))]
    pub fn complete_batch(&self, batch_id: &str) -> Result<(), ServiceError> {
        if batch_id.is_empty() {
            return Err(ServiceError::invalid_argument("batch id must not be empty"));
        }

        let mut inner = self.inner.write();
        let staged = {
            let batch = inner.batches.get(batch_id).ok_or_else(|| {
                ServiceError::illegal_state(format!("unknown batch {batch_id}"))
            })?;
            if batch.state() != BatchState::Active {
                return Err(ServiceError::illegal_state(format!(
                    "batch {batch_id} is not active"
                )));
            }
            let staged = batch.drain();
            batch.mark_completed()?;
            staged
        };

        let instrument_count = staged.len();
        let mut superseded = 0usize;
        for price in staged {
            let instrument_id = price.instrument_id().to_owned();
            inner
                .latest
                .entry(instrument_id)
                .and_modify(|incumbent| {
                    let merged = incumbent.clone().retain_latest(price.clone());
                    if merged != *incumbent {
                        superseded += 1;
                    }
                    *incumbent = merged;
                })
                .or_insert(price);
        }

        info!(batch_id, instrument_count, superseded, "completed batch");
        Ok(())
    }

    /// Discards `batch_id`'s staged data and transitions it to `Cancelled`.
    ///
    /// The latest-price table is untouched; no prior data from this batch is ever visible
    /// to a reader.
    #[instrument(target = COMPONENT, skip(self))]
    pub fn cancel_batch(&self, batch_id: &str) -> Result<(), ServiceError> {
        if batch_id.is_empty() {
            return Err(ServiceError::invalid_argument("batch id must not be empty"));
        }

        let inner = self.inner.write();
        let batch = inner
            .batches
            .get(batch_id)
            .ok_or_else(|| ServiceError::illegal_state(format!("unknown batch {batch_id}")))?;
        if batch.state() != BatchState::Active {
            return Err(ServiceError::illegal_state(format!("batch {batch_id} is not active")));
        }
        batch.mark_cancelled()?;
        info!(batch_id, "cancelled batch");
        Ok(())
    }

    /// Looks up the current latest-price entry for a single instrument.
    ///
    /// `instrument_id = None` is a caller error (`InvalidArgument`); `Some("")` is a normal
    /// miss (`Ok(None)`) — the two are distinguished by taking `Option<&str>` rather than
    /// collapsing both into a plain string.
    pub fn get_latest_price(
        &self,
        instrument_id: Option<&str>,
    ) -> Result<Option<PriceRecord>, ServiceError> {
        let Some(instrument_id) = instrument_id else {
            return Err(ServiceError::invalid_argument("instrument id must not be absent"));
        };
        if instrument_id.is_empty() {
            return Ok(None);
        }

        let inner = self.inner.read();
        Ok(inner.latest.get(instrument_id).cloned())
    }

    /// Looks up the current latest-price entries for a batch of instruments.
    ///
    /// Rejects an absent list with `InvalidArgument`. Empty ids inside the supplied slice
    /// are skipped silently; instruments with no committed price are simply omitted from
    /// the result rather than raising an error.
    pub fn get_latest_prices(
        &self,
        instrument_ids: Option<&[String]>,
    ) -> Result<HashMap<String, PriceRecord>, ServiceError> {
        let Some(instrument_ids) = instrument_ids else {
            return Err(ServiceError::invalid_argument("instrument id list must not be absent"));
        };

        let inner = self.inner.read();
        let mut result = HashMap::with_capacity(instrument_ids.len());
        for instrument_id in instrument_ids {
            if instrument_id.is_empty() {
                continue;
            }
            if let Some(price) = inner.latest.get(instrument_id.as_str()) {
                result.insert(instrument_id.clone(), price.clone());
            }
        }
        Ok(result)
    }

    /// Returns a read-only snapshot of the entire latest-price table.
    #[must_use]
    pub fn get_all_latest_prices(&self) -> HashMap<String, PriceRecord> {
        self.inner.read().latest.clone()
    }

    /// Testing-only: drops every batch and clears the latest-price table.
    ///
    /// Acquires the exclusive lock; in-flight operations either complete before this runs
    /// or fail with `IllegalState` against a batch this call has already evicted.
    #[instrument(target = COMPONENT, skip(self))]
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.batches.clear();
        inner.latest.clear();
        info!("reset price service");
    }
}
