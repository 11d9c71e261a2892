//! Reviewer agent: binary APPROVE/REVISE decision over the Writer's draft.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use taskweave_core::PipelineContext;
use tokio::time::sleep;

use super::{to_output, Agent, DraftOutput, WriterAgent};
use crate::error::AgentError;
use crate::recorder::EventRecorder;

pub const ACTION_APPROVE: &str = "APPROVE";
pub const ACTION_REVISE: &str = "REVISE";

const REVIEW_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_REJECTION_RATE: f64 = 0.3;

/// Reviews the draft and is the sole source of the feedback signal.
///
/// Requests revision at most once per task (stage-local policy; the
/// orchestrator enforces its own cap independently).
pub struct ReviewerAgent {
    rejection_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutput {
    pub approved: bool,
    pub feedback: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<String>,
}

impl ReviewerAgent {
    pub const NAME: &'static str = "Reviewer";

    pub fn new() -> Self {
        Self {
            rejection_rate: DEFAULT_REJECTION_RATE,
        }
    }

    pub fn with_rejection_rate(rejection_rate: f64) -> Self {
        Self { rejection_rate }
    }
}

impl Default for ReviewerAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute_logic(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value, AgentError> {
        let draft = ctx
            .output(WriterAgent::NAME)
            .and_then(|v| serde_json::from_value::<DraftOutput>(v.clone()).ok())
            .ok_or_else(|| AgentError::fatal("Reviewer requires a draft from Writer"))?;

        if ctx.revision_count > 0 {
            recorder
                .info(
                    ctx.task_id,
                    Self::NAME,
                    format!("Reviewing revised draft (revision #{}).", ctx.revision_count),
                )
                .await?;
        } else {
            recorder
                .info(
                    ctx.task_id,
                    Self::NAME,
                    "Starting quality review on initial draft.",
                )
                .await?;
        }

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                "Checking structure, tone, and completeness of the report.",
            )
            .await?;

        sleep(REVIEW_DELAY).await;

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                "Evaluating conclusion and executive summary quality.",
            )
            .await?;

        // Reject randomly, but never more than once per task.
        if ctx.revision_count < 1 && rand::thread_rng().gen::<f64>() < self.rejection_rate {
            recorder
                .info(
                    ctx.task_id,
                    Self::NAME,
                    "Decision: REVISE. The conclusion tone is too informal.",
                )
                .await?;
            return to_output(&ReviewOutput {
                approved: false,
                feedback: "The tone in the Conclusion section is a bit informal. \
                           Please revise and add more academic rigor."
                    .to_string(),
                action: ACTION_REVISE.to_string(),
                final_report: None,
            });
        }

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                "Decision: APPROVED. The report meets all quality standards.",
            )
            .await?;
        to_output(&ReviewOutput {
            approved: true,
            feedback: "The report looks solid. It meets all quality standards.".to_string(),
            action: ACTION_APPROVE.to_string(),
            final_report: Some(draft.draft),
        })
    }
}
