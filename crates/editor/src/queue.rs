//! Single-consumer batch-save queue.
//!
//! A batch is a snapshot of staged keys taken when the save was
//! requested. One worker task drains the queue, one batch at a time and
//! one key at a time: each save is awaited, then the worker sleeps the
//! configured step delay before starting the next key. Progress is
//! published on a watch channel and every batch can be cancelled between
//! keys through its own child [`CancellationToken`].

use std::sync::Arc;
use std::time::Duration;

use rota_core::grid::CellKey;
use rota_core::types::ScheduleId;
use rota_events::bus::{EditorEvent, EventBus};
use rota_events::toast::ToastCenter;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::error::EditorError;
use crate::sync::{SaveOrchestrator, SaveOutcome};

/// Batches waiting behind the running one.
const QUEUE_CAPACITY: usize = 16;

/// Live view of the batch being processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchProgress {
    pub schedule_id: Option<ScheduleId>,
    pub total: usize,
    pub completed: usize,
    /// Key whose save is in flight.
    pub current: Option<CellKey>,
}

impl BatchProgress {
    pub fn is_running(&self) -> bool {
        self.schedule_id.is_some()
    }
}

/// Result of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Keys in processing order with their outcome.
    pub outcomes: Vec<(CellKey, SaveOutcome)>,
    /// Keys left untouched because the batch was cancelled.
    pub unprocessed: Vec<CellKey>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

/// Handle to a submitted batch.
#[derive(Debug)]
pub struct BatchTicket {
    pub schedule_id: ScheduleId,
    /// The snapshot being saved, in processing order.
    pub keys: Vec<CellKey>,
    cancel: CancellationToken,
    done: oneshot::Receiver<BatchReport>,
}

impl BatchTicket {
    /// Stop the batch before its next key. The key in flight still
    /// completes.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the batch to finish.
    pub async fn wait(self) -> Result<BatchReport, EditorError> {
        self.done.await.map_err(|_| EditorError::QueueClosed)
    }
}

struct BatchJob {
    schedule_id: ScheduleId,
    keys: Vec<CellKey>,
    cancel: CancellationToken,
    done: oneshot::Sender<BatchReport>,
}

/// Sender side of the batch-save worker.
pub struct SaveQueue {
    jobs: mpsc::Sender<BatchJob>,
    progress: watch::Receiver<BatchProgress>,
    cancel: CancellationToken,
}

impl SaveQueue {
    /// Spawn the worker task. It runs until `cancel` fires or the queue is
    /// dropped. Must be called inside a Tokio runtime.
    pub fn spawn(
        orchestrator: Arc<SaveOrchestrator>,
        bus: Arc<EventBus>,
        toasts: ToastCenter,
        step_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (jobs, rx) = mpsc::channel(QUEUE_CAPACITY);
        let (progress_tx, progress) = watch::channel(BatchProgress::default());

        let worker = SaveWorker {
            orchestrator,
            bus,
            toasts,
            step_delay,
            progress: progress_tx,
        };
        tokio::spawn(worker.run(rx, cancel.clone()));

        Self {
            jobs,
            progress,
            cancel,
        }
    }

    /// Enqueue a snapshot of keys for `schedule_id`.
    pub async fn submit(
        &self,
        schedule_id: ScheduleId,
        keys: Vec<CellKey>,
    ) -> Result<BatchTicket, EditorError> {
        let cancel = self.cancel.child_token();
        let (done, done_rx) = oneshot::channel();
        let job = BatchJob {
            schedule_id,
            keys: keys.clone(),
            cancel: cancel.clone(),
            done,
        };
        self.jobs
            .send(job)
            .await
            .map_err(|_| EditorError::QueueClosed)?;

        tracing::info!(schedule_id, total = keys.len(), "Batch save queued");
        Ok(BatchTicket {
            schedule_id,
            keys,
            cancel,
            done: done_rx,
        })
    }

    pub fn progress(&self) -> BatchProgress {
        self.progress.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.clone()
    }

    /// Stop the worker. Batches already queued are cancelled.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

struct SaveWorker {
    orchestrator: Arc<SaveOrchestrator>,
    bus: Arc<EventBus>,
    toasts: ToastCenter,
    step_delay: Duration,
    progress: watch::Sender<BatchProgress>,
}

impl SaveWorker {
    async fn run(self, mut jobs: mpsc::Receiver<BatchJob>, cancel: CancellationToken) {
        tracing::debug!(
            step_delay_ms = self.step_delay.as_millis() as u64,
            "Save worker started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Save worker shutting down");
                    break;
                }
                job = jobs.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => break,
                },
            }
        }
    }

    async fn process(&self, job: BatchJob) {
        let BatchJob {
            schedule_id,
            keys,
            cancel,
            done,
        } = job;
        let total = keys.len();

        self.bus
            .publish(EditorEvent::BatchStarted { schedule_id, total });
        self.progress.send_replace(BatchProgress {
            schedule_id: Some(schedule_id),
            total,
            completed: 0,
            current: None,
        });

        let mut report = BatchReport::default();
        let mut pending = keys.into_iter().enumerate().peekable();

        while let Some((index, key)) = pending.next() {
            if cancel.is_cancelled() {
                report.unprocessed.push(key);
                continue;
            }

            self.progress.send_modify(|p| p.current = Some(key));
            let outcome = self.orchestrator.save_staged(key).await;
            tracing::debug!(schedule_id, %key, index, ?outcome, "Batch step finished");
            report.outcomes.push((key, outcome));

            self.progress.send_modify(|p| {
                p.completed = index + 1;
                p.current = None;
            });
            self.bus.publish(EditorEvent::BatchStep {
                schedule_id,
                key,
                index,
            });

            if pending.peek().is_some() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.step_delay) => {}
                }
            }
        }
        report.cancelled = !report.unprocessed.is_empty();

        self.orchestrator.hours().refresh(schedule_id).await;

        if report.cancelled {
            tracing::info!(
                schedule_id,
                processed = report.processed(),
                unprocessed = report.unprocessed.len(),
                "Batch save cancelled",
            );
            self.toasts.warning(format!(
                "Save stopped; {} change(s) left unsaved",
                report.unprocessed.len(),
            ));
        } else {
            tracing::info!(
                schedule_id,
                processed = report.processed(),
                failures = report.failures(),
                "Batch save finished",
            );
            self.toasts.success("Changes saved successfully.");
        }

        self.bus.publish(EditorEvent::BatchCompleted {
            schedule_id,
            processed: report.processed(),
            cancelled: report.cancelled,
        });
        self.progress.send_replace(BatchProgress::default());

        // The submitter may have stopped waiting.
        let _ = done.send(report);
    }
}
