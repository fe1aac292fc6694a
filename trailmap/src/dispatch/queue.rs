//! Bounded outbound queues, one worker per sink.
//!
//! ```text
//!                 ┌─► [queue] ─► worker ─► upsert_location
//! submit(point) ──┤
//!                 └─► [queue] ─► worker ─► append_track_point
//! ```
//!
//! `submit` never waits: a full queue drops the point for that sink only.
//! Each worker delivers its points in order, retrying transient failures
//! per [`RetryPolicy`]. Dropping the dispatcher closes the queues; workers
//! finish what is already queued and exit.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::policy::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use super::stats::{DispatchMetrics, DispatchSnapshot};
use crate::model::GeoPoint;
use crate::service::{DataService, ServiceError};

/// Default capacity of each sink queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// A remote destination for live points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// The user's current-location record.
    CurrentLocation,
    /// The in-progress track.
    TrackPoint,
}

impl SinkKind {
    pub const ALL: [SinkKind; 2] = [SinkKind::CurrentLocation, SinkKind::TrackPoint];

    pub fn name(&self) -> &'static str {
        match self {
            SinkKind::CurrentLocation => "location",
            SinkKind::TrackPoint => "track_point",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Queue sizing and retry behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retry: RetryPolicy::exponential(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

impl DispatchConfig {
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

struct SinkQueue {
    kind: SinkKind,
    tx: mpsc::Sender<GeoPoint>,
}

/// Fans points out to both remote sinks without blocking the caller.
pub struct OutboundDispatcher {
    queues: [SinkQueue; 2],
    metrics: Arc<DispatchMetrics>,
    workers: Vec<JoinHandle<()>>,
}

impl OutboundDispatcher {
    /// Spawn one worker per sink on the current tokio runtime.
    pub fn spawn(
        service: Arc<dyn DataService>,
        config: DispatchConfig,
        metrics: Arc<DispatchMetrics>,
    ) -> Self {
        let capacity = config.queue_capacity.max(1);
        let mut workers = Vec::with_capacity(SinkKind::ALL.len());
        let queues = SinkKind::ALL.map(|kind| {
            let (tx, rx) = mpsc::channel(capacity);
            workers.push(tokio::spawn(run_sink(
                kind,
                rx,
                Arc::clone(&service),
                config.retry.clone(),
                Arc::clone(&metrics),
            )));
            SinkQueue { kind, tx }
        });
        debug!(capacity, retry = ?config.retry, "Outbound dispatcher started");

        Self {
            queues,
            metrics,
            workers,
        }
    }

    /// Queue `point` for both sinks. Never waits.
    pub fn submit(&self, point: &GeoPoint) {
        for queue in &self.queues {
            match queue.tx.try_send(point.clone()) {
                Ok(()) => self.metrics.enqueued(queue.kind),
                Err(TrySendError::Full(_)) => {
                    warn!(sink = %queue.kind, "Outbound queue full, dropping point");
                    self.metrics.dropped(queue.kind);
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(sink = %queue.kind, "Outbound queue closed, dropping point");
                    self.metrics.dropped(queue.kind);
                }
            }
        }
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Close the queues and wait until every queued point has been
    /// delivered or given up on.
    pub async fn drain(self) -> DispatchSnapshot {
        let Self {
            queues,
            metrics,
            workers,
        } = self;
        drop(queues);
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Dispatch worker panicked");
            }
        }
        metrics.snapshot()
    }
}

async fn run_sink(
    kind: SinkKind,
    mut rx: mpsc::Receiver<GeoPoint>,
    service: Arc<dyn DataService>,
    retry: RetryPolicy,
    metrics: Arc<DispatchMetrics>,
) {
    while let Some(point) = rx.recv().await {
        match deliver(kind, &point, service.as_ref(), &retry, &metrics).await {
            Ok(()) => metrics.delivered(kind),
            Err(e) => {
                warn!(sink = %kind, error = %e, lat = point.latitude, lon = point.longitude, "Giving up on point");
                metrics.failed(kind);
            }
        }
    }
    debug!(sink = %kind, "Dispatch worker stopped");
}

async fn deliver(
    kind: SinkKind,
    point: &GeoPoint,
    service: &dyn DataService,
    retry: &RetryPolicy,
    metrics: &DispatchMetrics,
) -> Result<(), ServiceError> {
    let mut attempt = 1;
    loop {
        let result = match kind {
            SinkKind::CurrentLocation => service.upsert_location(point).await.map(|_| ()),
            SinkKind::TrackPoint => service.append_track_point(point).await,
        };
        let err = match result {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(e),
        };
        let Some(delay) = retry.delay_for_attempt(attempt) else {
            return Err(err);
        };
        debug!(sink = %kind, attempt, delay_ms = delay.as_millis() as u64, error = %err, "Retrying sink call");
        metrics.retried(kind);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::MockDataService;
    use chrono::Utc;
    use std::time::Duration;

    fn point(lat: f64) -> GeoPoint {
        GeoPoint::new(lat, 37.0, Utc::now())
    }

    fn transient() -> ServiceError {
        ServiceError::Transport("connection reset".into())
    }

    fn quick_retry(attempts: u32) -> DispatchConfig {
        DispatchConfig::default().with_retry(RetryPolicy::fixed(attempts, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_delivers_to_both_sinks_in_order() {
        let service = Arc::new(MockDataService::new());
        let dispatcher = OutboundDispatcher::spawn(
            service.clone(),
            DispatchConfig::default(),
            Arc::new(DispatchMetrics::new()),
        );
        for lat in [1.0, 2.0, 3.0] {
            dispatcher.submit(&point(lat));
        }
        let stats = dispatcher.drain().await;

        assert_eq!(stats.location.delivered, 3);
        assert_eq!(stats.track_point.delivered, 3);
        let lats: Vec<f64> = service.track_points.lock().iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let service = Arc::new(MockDataService::failing_sinks([transient(), transient()]));
        let dispatcher = OutboundDispatcher::spawn(
            service.clone(),
            quick_retry(3),
            Arc::new(DispatchMetrics::new()),
        );
        dispatcher.submit(&point(1.0));
        let stats = dispatcher.drain().await;

        assert_eq!(stats.location.delivered + stats.track_point.delivered, 2);
        assert_eq!(stats.location.retried + stats.track_point.retried, 2);
        assert_eq!(stats.location.failed + stats.track_point.failed, 0);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let rejected = ServiceError::Status {
            status: 422,
            url: "locations".into(),
        };
        let service = Arc::new(MockDataService::failing_sinks([rejected.clone(), rejected]));
        let dispatcher = OutboundDispatcher::spawn(
            service.clone(),
            quick_retry(5),
            Arc::new(DispatchMetrics::new()),
        );
        dispatcher.submit(&point(1.0));
        let stats = dispatcher.drain().await;

        assert_eq!(stats.location.failed + stats.track_point.failed, 2);
        assert_eq!(stats.location.retried + stats.track_point.retried, 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_count_as_failed() {
        let service = Arc::new(MockDataService::failing_sinks(
            std::iter::repeat_with(transient).take(10),
        ));
        let dispatcher = OutboundDispatcher::spawn(
            service.clone(),
            quick_retry(2),
            Arc::new(DispatchMetrics::new()),
        );
        dispatcher.submit(&point(1.0));
        let stats = dispatcher.drain().await;

        assert_eq!(stats.location.failed, 1);
        assert_eq!(stats.track_point.failed, 1);
        assert_eq!(stats.location.retried, 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_without_blocking() {
        let service = Arc::new(MockDataService::new());
        let dispatcher = OutboundDispatcher::spawn(
            service.clone(),
            DispatchConfig::default().with_queue_capacity(2),
            Arc::new(DispatchMetrics::new()),
        );
        // workers cannot run until this task yields
        for lat in 0..5 {
            dispatcher.submit(&point(lat as f64));
        }
        let queued = dispatcher.stats();
        assert_eq!(queued.location.enqueued, 2);
        assert_eq!(queued.location.dropped, 3);

        let stats = dispatcher.drain().await;
        assert_eq!(stats.track_point.delivered, 2);
        assert_eq!(stats.track_point.dropped, 3);
    }

    #[test]
    fn test_sink_names() {
        assert_eq!(SinkKind::CurrentLocation.to_string(), "location");
        assert_eq!(SinkKind::TrackPoint.to_string(), "track_point");
    }
}
