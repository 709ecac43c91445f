//! Bounded background event writer.
//!
//! Batches go onto a bounded queue drained by a fixed pool of worker tasks.
//! Submission never waits: when the queue is full the batch is dropped,
//! logged and counted. Batches may be written out of submission order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use common::OutboxConfig;
use domain::{DomainEvent, EventPublisher};

type Batch = Vec<DomainEvent>;

/// Result of handing a batch to the background writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Queued,
    /// Queue full; the batch was discarded
    Dropped,
    /// Shut down; the batch was discarded
    Closed,
}

/// Fire-and-forget event publishing over a worker pool.
pub struct AsyncEventPublisher {
    sender: Mutex<Option<mpsc::Sender<Batch>>>,
    workers: AsyncMutex<JoinSet<()>>,
    dropped: AtomicU64,
}

impl AsyncEventPublisher {
    /// Spawn `config.workers` writer tasks on the current runtime.
    pub fn start(publisher: Arc<dyn EventPublisher>, config: &OutboxConfig) -> Self {
        let worker_count = config.workers.max(1);
        let (sender, receiver) = mpsc::channel::<Batch>(config.queue_capacity.max(1));
        let receiver = Arc::new(AsyncMutex::new(receiver));

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            let publisher = Arc::clone(&publisher);
            workers.spawn(run_worker(worker_id, receiver, publisher));
        }

        info!(
            workers = worker_count,
            queue_capacity = config.queue_capacity,
            "Background event writers started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            workers: AsyncMutex::new(workers),
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue a batch without waiting.
    pub fn publish_async(&self, events: Vec<DomainEvent>) -> Submission {
        if events.is_empty() {
            return Submission::Queued;
        }

        let guard = self.sender.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = guard.as_ref() else {
            return Submission::Closed;
        };

        match sender.try_send(events) {
            Ok(()) => Submission::Queued,
            Err(TrySendError::Full(batch)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    batch_size = batch.len(),
                    aggregate_id = %batch[0].aggregate_id,
                    dropped_total = total,
                    "Event queue full, dropping batch"
                );
                Submission::Dropped
            }
            Err(TrySendError::Closed(_)) => Submission::Closed,
        }
    }

    /// Number of batches discarded because the queue was full.
    pub fn dropped_batches(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting batches, let the workers drain the queue, and wait for them.
    pub async fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(sender);

        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!("Event writer task failed: {}", e);
            }
        }
        info!("Background event writers stopped");
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<AsyncMutex<mpsc::Receiver<Batch>>>,
    publisher: Arc<dyn EventPublisher>,
) {
    loop {
        let batch = receiver.lock().await.recv().await;
        let Some(batch) = batch else {
            break;
        };

        match publisher.publish(&batch).await {
            Ok(()) => debug!(worker_id, batch_size = batch.len(), "Event batch written"),
            Err(e) => error!(
                worker_id,
                batch_size = batch.len(),
                error = %e,
                "Failed to write event batch"
            ),
        }
    }
}
