//! Task board store: owns the board and pushes status changes to the
//! task collection without waiting for them.
//!
//! Moves across columns are applied locally first. The matching
//! `update_status` call runs on a spawned task and reports back over a
//! channel; failures land in a retry queue and never undo the local move.
//! A full [`TaskBoardStore::reload`] brings the board back in line with the
//! collection.
//!
//! Every update carries a per-store sequence number and the reload epoch it
//! was sent in. Only the newest update for a task, sent since the last
//! reload, may end up in the retry queue.

use crate::{
    domain::{Board, BoardConfig, DropEvent, SortPolicy, TaskId, TaskRecord, TaskStatus},
    error::Result,
    storage::TaskCollection,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

/// A status change destined for the task collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub attempts: u32,
    /// Send order within the store, increasing
    pub sequence: u64,
    /// Reload epoch the update was sent in
    pub epoch: u64,
}

/// A status change the collection did not accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpdate {
    pub update: StatusUpdate,
    pub error: String,
}

#[derive(Debug)]
enum SyncOutcome {
    Confirmed(StatusUpdate),
    Failed(FailedUpdate),
}

/// Outcomes collected since the last report.
///
/// Outcomes already absorbed when a later move was sent are not repeated
/// here; their failures show up in [`TaskBoardStore::pending_retries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub confirmed: Vec<StatusUpdate>,
    pub failed: Vec<FailedUpdate>,
    /// Failures dropped because a newer update or a reload replaced them
    pub superseded: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct TaskBoardStore {
    config: BoardConfig,
    board: Board,
    collection: Arc<dyn TaskCollection>,
    in_flight: Vec<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<SyncOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<SyncOutcome>,
    retry_queue: Vec<FailedUpdate>,
    epoch: u64,
    next_sequence: u64,
    latest_sent: HashMap<TaskId, u64>,
}

impl TaskBoardStore {
    /// Creates an empty store; the board starts with the config's default sort
    pub fn new(config: BoardConfig, collection: Arc<dyn TaskCollection>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            board: Board::new(config.default_sort),
            config,
            collection,
            in_flight: Vec::new(),
            outcomes_tx,
            outcomes_rx,
            retry_queue: Vec::new(),
            epoch: 0,
            next_sequence: 0,
            latest_sent: HashMap::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Rebuilds the board from records already in hand
    pub fn load<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = TaskRecord>,
    {
        self.board.load(records, &self.config);
    }

    /// Fetches the full listing from the collection and rebuilds the board.
    ///
    /// The collection is authoritative after a reload: queued retries are
    /// discarded and failures of updates sent before it are ignored when they
    /// arrive. Updates still in flight are not cancelled.
    pub async fn reload(&mut self) -> Result<()> {
        let records = self.collection.list().await?;
        self.load(records);

        self.epoch += 1;
        self.latest_sent.clear();
        if !self.retry_queue.is_empty() {
            tracing::info!(
                discarded = self.retry_queue.len(),
                "reload supersedes queued status retries"
            );
            self.retry_queue.clear();
        }
        Ok(())
    }

    pub fn set_sort_policy(&mut self, policy: SortPolicy) {
        tracing::debug!(%policy, "sort policy changed");
        self.board.set_sort_policy(policy);
    }

    /// Reorders a column; nothing is persisted
    pub fn move_within_column(&mut self, status: TaskStatus, from: usize, to: usize) -> bool {
        self.board.move_within_column(status, from, to)
    }

    /// Moves a task to another column and fires the status update.
    ///
    /// Returns `false` when the move was out of range, in which case nothing
    /// is sent. A move inside one column is a plain reorder.
    pub fn move_across_columns(
        &mut self,
        from_status: TaskStatus,
        from: usize,
        to_status: TaskStatus,
        to: usize,
    ) -> bool {
        if from_status == to_status {
            return self.move_within_column(from_status, from, to);
        }

        match self
            .board
            .move_across_columns(from_status, from, to_status, to)
        {
            Some(task) => {
                self.send(task.id, to_status, 1);
                true
            }
            None => false,
        }
    }

    /// Interprets a drop reported by the drag-and-drop layer
    pub fn apply_drop(&mut self, event: DropEvent) -> bool {
        let Some(destination) = event.destination else {
            return false;
        };

        self.move_across_columns(
            event.source.status,
            event.source.index,
            destination.status,
            destination.index,
        )
    }

    /// Stamps a new update for `task_id`, replacing anything queued for it
    fn send(&mut self, task_id: TaskId, status: TaskStatus, attempts: u32) {
        self.drain_outcomes();
        self.retry_queue.retain(|queued| queued.update.task_id != task_id);

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.latest_sent.insert(task_id.clone(), sequence);

        self.dispatch(StatusUpdate {
            task_id,
            status,
            attempts,
            sequence,
            epoch: self.epoch,
        });
    }

    fn dispatch(&mut self, update: StatusUpdate) {
        self.in_flight.retain(|handle| !handle.is_finished());

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(task_id = %update.task_id, error = %e, "no runtime, queueing status update");
                self.retry_queue.push(FailedUpdate {
                    update,
                    error: e.to_string(),
                });
                return;
            }
        };

        let collection = Arc::clone(&self.collection);
        let outcomes = self.outcomes_tx.clone();
        self.in_flight.push(runtime.spawn(async move {
            let outcome = match collection
                .update_status(&update.task_id, update.status)
                .await
            {
                Ok(()) => {
                    tracing::debug!(task_id = %update.task_id, status = %update.status, "status persisted");
                    SyncOutcome::Confirmed(update)
                }
                Err(e) => {
                    tracing::warn!(
                        task_id = %update.task_id,
                        status = %update.status,
                        attempts = update.attempts,
                        error = %e,
                        "failed to persist status"
                    );
                    SyncOutcome::Failed(FailedUpdate {
                        update,
                        error: e.to_string(),
                    })
                }
            };
            // Receiver is gone once the store is dropped.
            let _ = outcomes.send(outcome);
        }));
    }

    /// Whether a failed update is still the one the board reflects
    fn is_current(&self, update: &StatusUpdate) -> bool {
        update.epoch == self.epoch
            && self.latest_sent.get(&update.task_id) == Some(&update.sequence)
    }

    fn drain_outcomes(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            match outcome {
                SyncOutcome::Confirmed(update) => report.confirmed.push(update),
                SyncOutcome::Failed(failed) if self.is_current(&failed.update) => {
                    self.retry_queue.push(failed.clone());
                    report.failed.push(failed);
                }
                SyncOutcome::Failed(failed) => {
                    tracing::debug!(
                        task_id = %failed.update.task_id,
                        sequence = failed.update.sequence,
                        epoch = failed.update.epoch,
                        "dropping superseded status failure"
                    );
                    report.superseded += 1;
                }
            }
        }
        report
    }

    /// Drains outcomes that have already arrived, without waiting
    pub fn collect_outcomes(&mut self) -> SyncReport {
        self.drain_outcomes()
    }

    /// Waits for every in-flight update and reports what happened
    pub async fn settle(&mut self) -> SyncReport {
        for handle in std::mem::take(&mut self.in_flight) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "status update task did not complete");
            }
        }
        self.drain_outcomes()
    }

    /// Number of updates sent but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    /// Updates that failed and have not been retried, at most one per task
    pub fn pending_retries(&self) -> &[FailedUpdate] {
        &self.retry_queue
    }

    /// Re-sends every queued update; returns how many were sent
    pub fn retry_failed(&mut self) -> usize {
        let queued = std::mem::take(&mut self.retry_queue);
        let count = queued.len();
        for failed in queued {
            let update = failed.update;
            self.send(update.task_id, update.status, update.attempts + 1);
        }
        count
    }
}
