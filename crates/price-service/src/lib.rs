//! An in-memory, concurrent service for publishing and querying the latest price of
//! financial instruments.
//!
//! Producers stage prices into isolated batches via [`PriceService::start_batch`] and
//! [`PriceService::upload_price`]; a batch is invisible to readers until it is atomically
//! [`PriceService::complete_batch`]d, at which point all of its prices become
//! simultaneously visible. Readers query the latest committed price per instrument via
//! [`PriceService::get_latest_price`] and friends.
//!
//! This crate has no wire, file, or CLI surface: it is meant to be embedded by a process
//! that owns those concerns (a price source adapter, a gRPC/HTTP façade, persistence) and
//! drives this state machine in-process.

mod batch;
mod error;
mod id;
mod record;
mod service;

pub use error::ServiceError;
pub use id::BatchId;
pub use record::{AsOf, Payload, PriceRecord};
pub use service::PriceService;

/// Tracing target shared by every span this crate emits, so downstream subscribers can
/// filter on it independently of module paths.
pub(crate) const COMPONENT: &str = "price-service";
