//! Paced draining of the review backlog.
//!
//! Only the authority drains. Every interval, a pass takes operations one at
//! a time in enqueue order, announces each, and calls the review store. A
//! pass that consumed anything ends with a single refresh announcement.

use std::time::Duration;

use async_trait::async_trait;
use courtroom_core::review::{ReviewKind, ReviewStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::operation::ReviewOperation;
use crate::domain::queue::ReviewQueue;

/// Receives the announcements a drain pass makes.
#[async_trait]
pub trait DrainSink: Send + Sync {
    /// An operation is about to be sent to the store.
    async fn processing(&self, kind: ReviewKind, review_id: Option<Uuid>);

    /// A pass finished; participants should reload their review lists.
    async fn refresh(&self, session_id: Uuid, triggered_by: Uuid, action: &'static str);
}

/// Delays applied within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainPacing {
    /// Pause after dequeuing each operation.
    pub per_operation: Duration,
    /// Pause between the last operation and the refresh announcement.
    pub settle: Duration,
}

impl Default for DrainPacing {
    fn default() -> Self {
        Self {
            per_operation: Duration::from_millis(100),
            settle: Duration::from_millis(100),
        }
    }
}

/// Summary of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Operations consumed, successful or not.
    pub processed: usize,
    /// Operations whose store call failed.
    pub failed: usize,
}

async fn apply_operation(operation: &ReviewOperation, store: &dyn ReviewStore) -> bool {
    let result = match (operation.kind, operation.review_id) {
        (ReviewKind::Create, _) => store
            .create_review(operation.session_id, operation.user_id, &operation.payload)
            .await
            .map(|review| debug!(review_id = %review.id, "review created")),
        (ReviewKind::Update, Some(review_id)) => store
            .update_review(review_id, &operation.payload)
            .await
            .map(|_| debug!(%review_id, "review updated")),
        (ReviewKind::Delete, Some(review_id)) => store.delete_review(review_id).await,
        (ReviewKind::Update | ReviewKind::Delete, None) => {
            warn!(kind = %operation.kind, "review operation without target skipped");
            return false;
        }
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, kind = %operation.kind, user_id = %operation.user_id, "review operation failed");
            false
        }
    }
}

/// Runs one pass over the backlog.
///
/// Failed store calls are logged and still count as consumed; nothing is
/// retried.
pub async fn drain_pass(
    queue: &ReviewQueue,
    store: &dyn ReviewStore,
    sink: &dyn DrainSink,
    pacing: DrainPacing,
) -> DrainReport {
    let mut report = DrainReport::default();
    let mut last = None;

    while let Some(operation) = queue.pop() {
        tokio::time::sleep(pacing.per_operation).await;
        sink.processing(operation.kind, operation.review_id).await;
        if !apply_operation(&operation, store).await {
            report.failed += 1;
        }
        report.processed += 1;
        last = Some(operation);
    }

    if let Some(last) = last {
        tokio::time::sleep(pacing.settle).await;
        sink.refresh(queue.session_id(), last.user_id, last.kind.action())
            .await;
        info!(processed = report.processed, failed = report.failed, "review backlog drained");
    }
    report
}

/// Drains `queue` every `interval` until `cancel` fires.
pub async fn run_drain_loop(
    queue: ReviewQueue,
    store: &dyn ReviewStore,
    sink: &dyn DrainSink,
    interval: Duration,
    pacing: DrainPacing,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
        if queue.is_empty() {
            continue;
        }
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = drain_pass(&queue, store, sink, pacing) => {}
        }
    }
    debug!(pending = queue.len(), "review drain stopped");
}
