//! Outbound fan-out of live points to remote sinks.
//!
//! Local recording never waits on the network. Points are handed to
//! [`OutboundDispatcher::submit`], which queues them per sink and returns
//! immediately; failures are retried per [`RetryPolicy`] and then counted,
//! never surfaced to the recording path.

mod policy;
mod queue;
mod stats;

pub use policy::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_SECS,
};
pub use queue::{DispatchConfig, OutboundDispatcher, SinkKind, DEFAULT_QUEUE_CAPACITY};
pub use stats::{DispatchMetrics, DispatchSnapshot, SinkSnapshot};
