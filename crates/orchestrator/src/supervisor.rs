//! Supervised background execution of task pipelines.
//!
//! Each submitted task runs as one tokio task tracked by a handle registry,
//! so callers can observe liveness and failures instead of detaching
//! untracked work. A panicking pipeline unit is caught and persisted as a
//! task failure.

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use taskweave_core::PipelineConfig;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::pipeline::TaskOrchestrator;

#[derive(Clone)]
pub struct PipelineSupervisor {
    orchestrator: Arc<TaskOrchestrator>,
    running: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
}

impl PipelineSupervisor {
    pub fn new(orchestrator: Arc<TaskOrchestrator>) -> Self {
        Self {
            orchestrator,
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start a task's pipeline as an independent unit of work and return
    /// immediately.
    pub fn spawn(&self, task_id: Uuid, prompt: String, pipeline: PipelineConfig) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let running = Arc::clone(&self.running);

        let handle = tokio::spawn(async move {
            let run = AssertUnwindSafe(orchestrator.run(task_id, &prompt, &pipeline))
                .catch_unwind()
                .await;
            match run {
                Ok(Ok(())) => debug!(task_id = %task_id, "Pipeline unit finished"),
                // run() has already persisted the failure.
                Ok(Err(e)) => warn!(task_id = %task_id, error = %e, "Pipeline unit failed"),
                Err(_) => {
                    error!(task_id = %task_id, "Pipeline unit panicked");
                    if let Err(e) = orchestrator
                        .fail_with_message(task_id, "Pipeline execution panicked")
                        .await
                    {
                        error!(
                            task_id = %task_id,
                            error = %e,
                            "Failed to persist panic failure"
                        );
                    }
                }
            }
            lock(&running).remove(&task_id);
        });

        lock(&self.running).insert(task_id, handle);
    }

    pub fn is_running(&self, task_id: Uuid) -> bool {
        lock(&self.running)
            .get(&task_id)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn running_count(&self) -> usize {
        lock(&self.running)
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Await the unit tracked for a task. Returns false when none is
    /// tracked (never spawned, or already finished and reaped).
    pub async fn wait(&self, task_id: Uuid) -> bool {
        let handle = lock(&self.running).remove(&task_id);
        match handle {
            Some(handle) => {
                if let Err(e) = handle.await {
                    error!(task_id = %task_id, error = %e, "Pipeline unit join error");
                }
                true
            }
            None => false,
        }
    }
}

fn lock<'a>(
    map: &'a Mutex<HashMap<Uuid, JoinHandle<()>>>,
) -> MutexGuard<'a, HashMap<Uuid, JoinHandle<()>>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
