//! Researcher agent: concurrent fan-out over the planned sub-tasks.

use async_trait::async_trait;
use futures::future::try_join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use taskweave_core::PipelineContext;
use tokio::time::sleep;

use super::{to_output, Agent, PlanOutput, PlannerAgent};
use crate::error::AgentError;
use crate::recorder::EventRecorder;

const BASE_LATENCY_MS: u64 = 1500;
const LATENCY_JITTER_MS: u64 = 2000;

/// Runs one concurrent sub-computation per planned sub-task and joins them
/// all before returning.
///
/// The result list preserves the original sub-task order regardless of
/// completion order; if any sub-computation fails, the whole fan-out fails
/// with no partial results.
pub struct ResearcherAgent {
    /// Fixed per-index latencies for deterministic tests; random when unset.
    latencies: Option<Vec<Duration>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFinding {
    pub task: String,
    pub findings: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchOutput {
    pub research_results: Vec<ResearchFinding>,
}

impl ResearcherAgent {
    pub const NAME: &'static str = "Researcher";

    pub fn new() -> Self {
        Self { latencies: None }
    }

    pub fn with_latencies(latencies: Vec<Duration>) -> Self {
        Self {
            latencies: Some(latencies),
        }
    }

    fn latency_for(&self, index: usize) -> Duration {
        if let Some(latency) = self
            .latencies
            .as_ref()
            .and_then(|l| l.get(index).copied())
        {
            return latency;
        }
        let jitter = rand::thread_rng().gen_range(0..LATENCY_JITTER_MS);
        Duration::from_millis(BASE_LATENCY_MS + jitter)
    }

    async fn research_subtask(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
        index: usize,
        subtask: &str,
    ) -> Result<ResearchFinding, AgentError> {
        sleep(self.latency_for(index)).await;

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!("Completed subtask {}: {}", index + 1, subtask),
            )
            .await?;

        Ok(ResearchFinding {
            task: subtask.to_string(),
            findings: format!(
                "Simulated detailed findings for \"{}\". The results indicate \
                 significant patterns and data points relevant to the topic.",
                subtask
            ),
        })
    }
}

impl Default for ResearcherAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute_logic(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value, AgentError> {
        let plan = ctx
            .output(PlannerAgent::NAME)
            .and_then(|v| serde_json::from_value::<PlanOutput>(v.clone()).ok())
            .ok_or_else(|| {
                AgentError::fatal("Researcher requires output from Planner (missing subtasks)")
            })?;

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!(
                    "Starting concurrent research on {} subtasks...",
                    plan.subtasks.len()
                ),
            )
            .await?;

        let subtask_futures = plan
            .subtasks
            .iter()
            .enumerate()
            .map(|(index, subtask)| self.research_subtask(ctx, recorder, index, subtask));

        // try_join_all keeps the original sub-task order and fails fast.
        let research_results = try_join_all(subtask_futures).await?;

        to_output(&ResearchOutput { research_results })
    }
}
