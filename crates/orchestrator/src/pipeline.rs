//! The pipeline stepper: sequences agents, applies the feedback rule, and
//! finalizes task results.

use db::{EventRepository, TaskRepository};
use events::{Event, EventBus};
use serde_json::{json, Value};
use taskweave_core::{PipelineConfig, PipelineContext, Task, TaskStatus};
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::{ReviewerAgent, WriterAgent, ACTION_REVISE};
use crate::error::{OrchestratorError, Result};
use crate::recorder::EventRecorder;
use crate::registry::AgentRegistry;
use crate::runner::{AgentRunner, RetryPolicy};
use crate::state_machine::TaskStateMachine;

/// Final artifact when the pipeline produced neither a finalized report nor
/// a draft.
pub const FALLBACK_REPORT: &str = "No final report generated.";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hard cap on total revisions per task, enforced regardless of any
    /// self-limiting the Reviewer applies. Guarantees termination.
    pub max_revisions: u32,
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_revisions: 3,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct TaskOrchestrator {
    tasks: TaskRepository,
    recorder: EventRecorder,
    bus: EventBus,
    registry: AgentRegistry,
    config: OrchestratorConfig,
}

impl TaskOrchestrator {
    pub fn new(tasks: TaskRepository, events: EventRepository, bus: EventBus) -> Self {
        Self {
            tasks,
            recorder: EventRecorder::new(events, bus.clone()),
            bus,
            registry: AgentRegistry::standard(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the configured pipeline for a task to a terminal status.
    ///
    /// The task must be `pending`. Every outcome, success, agent failure,
    /// unknown agent, or exceeded revision cap, is persisted before this
    /// returns; the returned error mirrors what was persisted.
    pub async fn run(
        &self,
        task_id: Uuid,
        prompt: &str,
        pipeline: &PipelineConfig,
    ) -> Result<()> {
        let mut context = PipelineContext::new(task_id, prompt);
        let runner = AgentRunner::new(self.config.retry);

        self.transition(task_id, TaskStatus::InProgress, None).await?;
        info!(task_id = %task_id, pipeline = ?pipeline.agents, "Pipeline started");

        let mut step = 0;
        while step < pipeline.len() {
            let agent_name = &pipeline.agents[step];

            let Some(agent) = self.registry.get(agent_name) else {
                let err = OrchestratorError::UnknownAgent(agent_name.clone());
                self.abort(task_id, &err).await;
                return Err(err);
            };

            let output = match runner.run(agent.as_ref(), &context, &self.recorder).await {
                Ok(output) => output,
                Err(err) => {
                    self.abort(task_id, &err).await;
                    return Err(err);
                }
            };

            let wants_revision = agent_name == ReviewerAgent::NAME
                && output.get("action").and_then(Value::as_str) == Some(ACTION_REVISE);
            context.insert_output(agent_name.clone(), output);

            if wants_revision {
                context.revision_count += 1;
                if let Some(writer_index) = pipeline.position(WriterAgent::NAME) {
                    if context.revision_count > self.config.max_revisions {
                        let err = OrchestratorError::RevisionCapExceeded {
                            cap: self.config.max_revisions,
                        };
                        self.abort(task_id, &err).await;
                        return Err(err);
                    }
                    info!(
                        task_id = %task_id,
                        revision = context.revision_count,
                        "Reviewer requested revision, rewinding to Writer"
                    );
                    step = writer_index;
                    continue;
                }
                // No Writer in this pipeline: nothing to rewind to.
            }

            step += 1;
        }

        let final_report = context
            .output(ReviewerAgent::NAME)
            .and_then(|v| v.get("finalReport"))
            .and_then(Value::as_str)
            .or_else(|| {
                context
                    .output(WriterAgent::NAME)
                    .and_then(|v| v.get("draft"))
                    .and_then(Value::as_str)
            })
            .unwrap_or(FALLBACK_REPORT)
            .to_string();

        let result = json!({
            "pipelineOutput": Value::Object(context.state),
            "finalReport": final_report,
        });
        self.transition(task_id, TaskStatus::Completed, Some(result))
            .await?;

        info!(task_id = %task_id, "Pipeline completed");
        Ok(())
    }

    /// Persist a failure for the supervisor's panic path.
    pub(crate) async fn fail_with_message(&self, task_id: Uuid, message: &str) -> Result<()> {
        self.transition(
            task_id,
            TaskStatus::Failed,
            Some(json!({ "error": message })),
        )
        .await?;
        Ok(())
    }

    /// Mark the task failed; a store error here is logged rather than
    /// replacing the root cause the caller is about to return.
    async fn abort(&self, task_id: Uuid, err: &OrchestratorError) {
        error!(task_id = %task_id, error = %err, "Pipeline aborted");
        if let Err(store_err) = self.fail_with_message(task_id, &err.to_string()).await {
            error!(
                task_id = %task_id,
                error = %store_err,
                "Failed to persist task failure"
            );
        }
    }

    async fn transition(
        &self,
        task_id: Uuid,
        to: TaskStatus,
        result: Option<Value>,
    ) -> Result<Task> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(OrchestratorError::TaskNotFound(task_id))?;

        TaskStateMachine::validate_transition(&task.status, &to)?;
        let updated = self.tasks.update_status(task_id, to, result).await?;

        self.bus.publish(Event::TaskStatusChanged {
            task_id,
            from_status: task.status.as_str().to_string(),
            to_status: to.as_str().to_string(),
        });
        Ok(updated)
    }
}
