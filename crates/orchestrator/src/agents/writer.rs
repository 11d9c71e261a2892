//! Writer agent: synthesizes research results into a markdown report draft.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use taskweave_core::PipelineContext;
use tokio::time::sleep;

use super::{to_output, Agent, ResearchOutput, ResearcherAgent};
use crate::error::AgentError;
use crate::recorder::EventRecorder;

const WRITING_DELAY: Duration = Duration::from_millis(2500);

pub struct WriterAgent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOutput {
    pub draft: String,
}

impl WriterAgent {
    pub const NAME: &'static str = "Writer";

    pub fn new() -> Self {
        Self
    }
}

impl Default for WriterAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for WriterAgent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn execute_logic(
        &self,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value, AgentError> {
        let research = ctx
            .output(ResearcherAgent::NAME)
            .and_then(|v| serde_json::from_value::<ResearchOutput>(v.clone()).ok())
            .ok_or_else(|| AgentError::fatal("Writer requires output from Researcher"))?;

        let results = &research.research_results;

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!(
                    "Starting composition: synthesizing {} research results into a report.",
                    results.len()
                ),
            )
            .await?;

        sleep(WRITING_DELAY).await;

        let mut draft = format!("# Comprehensive Report: {}\n\n", ctx.prompt);
        draft.push_str("*Generated automatically by Taskweave*\n\n");

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!("Writing Executive Summary for \"{}\".", ctx.prompt),
            )
            .await?;
        draft.push_str("## Executive Summary\n");
        draft.push_str(&format!(
            "This document synthesizes findings regarding {}.\n\n",
            ctx.prompt
        ));

        for result in results {
            recorder
                .info(
                    ctx.task_id,
                    Self::NAME,
                    format!("Writing section: \"{}\"", result.task),
                )
                .await?;
            draft.push_str(&format!("### {}\n", result.task));
            draft.push_str(&format!("{}\n\n", result.findings));
        }

        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                "Writing Conclusion and finalizing draft.",
            )
            .await?;
        draft.push_str("## Conclusion\n");
        draft.push_str(&format!(
            "Overall, the analysis presents a comprehensive look at the requested topic, \
             derived from {} parallel research streams.\n",
            results.len()
        ));

        let line_count = draft.lines().count();
        recorder
            .info(
                ctx.task_id,
                Self::NAME,
                format!("Draft complete: {} lines written.", line_count),
            )
            .await?;

        to_output(&DraftOutput { draft })
    }
}
