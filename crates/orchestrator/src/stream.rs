//! Live per-task event subscription.
//!
//! A subscription replays every event already recorded for the task, then
//! follows the bus for new ones, and ends with exactly one status item once
//! the task reaches a terminal state. Gap-freedom comes from the store's
//! sequence numbers: live deliveries below the replay watermark are
//! dropped, and a bounded poll tick re-reads the store whenever the bus
//! cannot be trusted (lag, closure).

use db::{EventRepository, TaskRepository};
use events::{Event, EventBus};
use serde::Serialize;
use std::time::Duration;
use taskweave_core::{TaskEvent, TaskStatus};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
const CHANNEL_CAPACITY: usize = 64;

/// One item delivered to a subscriber: an event record, or the single
/// terminal status notification that ends the stream.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamItem {
    Event(TaskEvent),
    Status {
        #[serde(rename = "type")]
        kind: &'static str,
        status: TaskStatus,
    },
}

impl StreamItem {
    pub fn status_update(status: TaskStatus) -> Self {
        Self::Status {
            kind: "STATUS_UPDATE",
            status,
        }
    }
}

/// Subscribe to a task's event log.
///
/// Fails with [`OrchestratorError::TaskNotFound`] before any delivery if
/// the task does not exist. Dropping the returned stream stops delivery
/// without affecting the task's execution.
pub async fn subscribe(
    tasks: &TaskRepository,
    events: &EventRepository,
    bus: &EventBus,
    task_id: Uuid,
) -> Result<ReceiverStream<StreamItem>> {
    if tasks.find_by_id(task_id).await?.is_none() {
        return Err(OrchestratorError::TaskNotFound(task_id));
    }

    // Subscribe before replaying so nothing published mid-replay is lost.
    let rx = bus.subscribe();
    let (tx, out) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(deliver(tasks.clone(), events.clone(), rx, tx, task_id));

    Ok(ReceiverStream::new(out))
}

async fn deliver(
    tasks: TaskRepository,
    events: EventRepository,
    mut rx: broadcast::Receiver<Event>,
    tx: mpsc::Sender<StreamItem>,
    task_id: Uuid,
) {
    let mut last_seq = 0i64;

    // Replay everything recorded so far, in store order.
    match events.find_by_task(task_id).await {
        Ok(stored) => {
            for event in stored {
                last_seq = event.seq;
                if tx.send(StreamItem::Event(event)).await.is_err() {
                    return;
                }
            }
        }
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Event replay failed, closing stream");
            return;
        }
    }

    // The task may have reached a terminal status before we subscribed.
    match tasks.find_by_id(task_id).await {
        Ok(Some(task)) if task.status.is_terminal() => {
            finish(&events, &tx, task_id, last_seq, task.status).await;
            return;
        }
        Ok(_) => {}
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Task lookup failed, closing stream");
            return;
        }
    }

    let mut poll = interval(POLL_INTERVAL);
    let mut live = true;

    loop {
        tokio::select! {
            received = rx.recv(), if live => match received {
                Ok(Event::AgentEvent { event }) if event.task_id == task_id => {
                    if event.seq > last_seq {
                        last_seq = event.seq;
                        if tx.send(StreamItem::Event(event)).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(Event::TaskStatusChanged { task_id: changed, to_status, .. })
                    if changed == task_id =>
                {
                    if let Some(status) = TaskStatus::parse(&to_status) {
                        if status.is_terminal() {
                            finish(&events, &tx, task_id, last_seq, status).await;
                            return;
                        }
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(task_id = %task_id, skipped, "Subscriber lagged, catching up from store");
                    match flush(&events, &tx, task_id, &mut last_seq).await {
                        Ok(true) => {}
                        Ok(false) => return,
                        Err(e) => {
                            warn!(task_id = %task_id, error = %e, "Store read failed, closing stream");
                            return;
                        }
                    }
                }
                Err(RecvError::Closed) => {
                    live = false;
                }
            },
            _ = poll.tick() => {
                // Bounded fallback: pick up anything the bus did not deliver
                // and notice terminal statuses we missed.
                match flush(&events, &tx, task_id, &mut last_seq).await {
                    Ok(true) => {}
                    Ok(false) => return,
                    Err(e) => {
                        warn!(task_id = %task_id, error = %e, "Store read failed, closing stream");
                        return;
                    }
                }
                match tasks.find_by_id(task_id).await {
                    Ok(Some(task)) if task.status.is_terminal() => {
                        finish(&events, &tx, task_id, last_seq, task.status).await;
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(task_id = %task_id, error = %e, "Task poll failed, closing stream");
                        return;
                    }
                }
            }
        }
    }
}

/// Deliver store events newer than `last_seq`. Ok(false) means the
/// subscriber is gone.
async fn flush(
    events: &EventRepository,
    tx: &mpsc::Sender<StreamItem>,
    task_id: Uuid,
    last_seq: &mut i64,
) -> std::result::Result<bool, db::DbError> {
    for event in events.find_by_task_after(task_id, *last_seq).await? {
        *last_seq = event.seq;
        if tx.send(StreamItem::Event(event)).await.is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Drain any events appended before the terminal status landed, then send
/// the single closing status notification.
async fn finish(
    events: &EventRepository,
    tx: &mpsc::Sender<StreamItem>,
    task_id: Uuid,
    mut last_seq: i64,
    status: TaskStatus,
) {
    match flush(events, tx, task_id, &mut last_seq).await {
        Ok(true) => {
            let _ = tx.send(StreamItem::status_update(status)).await;
        }
        Ok(false) => {}
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Final drain failed, closing stream");
        }
    }
}
