//! Planner agent: splits the prompt into research sub-tasks.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use taskweave_core::PipelineContext;
use tokio::time::sleep;

use super::{to_output, Agent};
use crate::error::AgentError;
use crate::recorder::EventRecorder;

const THINKING_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_FAILURE_RATE: f64 = 0.2;

/// Divides the user prompt into three research sub-tasks.
///
/// Carries a simulated failure rate so the retry path is exercised under
/// realistic conditions; construct with a zero rate for deterministic runs.
pub struct PlannerAgent {
    failure_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub subtasks: Vec<String>,
    pub plan_description: String,
}

impl PlannerAgent {
    pub const NAME: &'static str = "Planner";

    pub fn new() -> Self {
        Self {
            failure_rate: DEFAULT_FAILURE_RATE,
        }
    }

    pub fn with_failure_rate(failure_rate: f64) -> Self {
        Self { failure_rate }
    }
}

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute_logic(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value, AgentError> {
        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!("Analyzing prompt: \"{}\"", ctx.prompt),
            )
            .await?;

        sleep(THINKING_DELAY).await;

        if rand::thread_rng().gen::<f64>() < self.failure_rate {
            return Err(AgentError::retryable(
                "Failed to contact planning service (simulated error)",
            ));
        }

        let subtasks = vec![
            format!("Research history and definitions of {}", ctx.prompt),
            format!("Analyze pros and cons of {}", ctx.prompt),
            format!(
                "Find industry case studies or examples related to {}",
                ctx.prompt
            ),
        ];

        for subtask in &subtasks {
            recorder
                .info(
                    ctx.task_id,
                    Self::NAME,
                    format!("Created subtask: \"{}\"", subtask),
                )
                .await?;
        }

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!(
                    "Plan finalized: {} subtasks queued for research.",
                    subtasks.len()
                ),
            )
            .await?;

        to_output(&PlanOutput {
            plan_description: format!(
                "Divided the request into {} distinct research tasks.",
                subtasks.len()
            ),
            subtasks,
        })
    }
}
