//! Concrete pipeline agents and the capability trait they implement.
//!
//! Each agent reads what it needs from the shared [`PipelineContext`],
//! produces one JSON output object, and emits descriptive `info` events
//! while it works. The simulated latencies and randomized failures stand in
//! for real computation and are configurable per instance so tests stay
//! deterministic.

mod planner;
mod researcher;
mod reviewer;
mod writer;

pub use planner::{PlanOutput, PlannerAgent};
pub use researcher::{ResearchFinding, ResearchOutput, ResearcherAgent};
pub use reviewer::{ReviewOutput, ReviewerAgent, ACTION_APPROVE, ACTION_REVISE};
pub use writer::{DraftOutput, WriterAgent};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use taskweave_core::PipelineContext;

use crate::error::AgentError;
use crate::recorder::EventRecorder;

/// One named unit of pipeline logic.
///
/// Implementations must not assume anything about their position in the
/// pipeline beyond the predecessor outputs they require.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute_logic(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value, AgentError>;
}

pub(crate) fn to_output<T: Serialize>(output: &T) -> Result<Value, AgentError> {
    serde_json::to_value(output).map_err(|e| AgentError::fatal(e.to_string()))
}
