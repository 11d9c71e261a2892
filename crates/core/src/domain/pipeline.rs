use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Standard four-stage pipeline run when a submission names no agents.
pub const STANDARD_PIPELINE: [&str; 4] = ["Planner", "Researcher", "Writer", "Reviewer"];

/// Ordered agent names defining a task's execution plan.
///
/// Duplicates are allowed so a pipeline can revisit an agent. Immutable for
/// the lifetime of the task it was submitted with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    pub agents: Vec<String>,
}

impl PipelineConfig {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Index of the first occurrence of `name`, if the pipeline contains it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|agent| agent == name)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            agents: STANDARD_PIPELINE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Per-task mutable state threaded through one pipeline run.
///
/// Owned exclusively by the execution unit running the task: agents read
/// predecessor outputs from `state`, the orchestrator writes each agent's
/// output under the agent's name after it completes.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub task_id: Uuid,
    pub prompt: String,
    pub state: Map<String, Value>,
    pub revision_count: u32,
}

impl PipelineContext {
    pub fn new(task_id: Uuid, prompt: impl Into<String>) -> Self {
        Self {
            task_id,
            prompt: prompt.into(),
            state: Map::new(),
            revision_count: 0,
        }
    }

    /// Output of a previously completed agent, if any.
    pub fn output(&self, agent_name: &str) -> Option<&Value> {
        self.state.get(agent_name)
    }

    pub fn insert_output(&mut self, agent_name: impl Into<String>, output: Value) {
        self.state.insert(agent_name.into(), output);
    }
}
