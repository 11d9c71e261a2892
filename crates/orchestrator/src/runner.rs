//! Retrying agent runner: wraps any agent's core logic with event logging
//! and bounded retry with exponential backoff.

use serde_json::Value;
use std::time::Duration;
use taskweave_core::{EventType, PipelineContext};
use tokio::time::sleep;
use tracing::warn;

use crate::agents::Agent;
use crate::error::{AgentError, OrchestratorError, Result};
use crate::recorder::EventRecorder;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt, so an agent runs at most
    /// `max_retries + 1` times.
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (1-based): `base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
        }
    }
}

/// Executes agents with start/success/retry/error event emission.
///
/// Knows nothing about pipeline position or feedback semantics; it is
/// parameterized only by the agent's identity and logic.
pub struct AgentRunner {
    policy: RetryPolicy,
}

impl AgentRunner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub async fn run(
        &self,
        agent: &dyn Agent,
        ctx: &PipelineContext,
        recorder: &EventRecorder,
    ) -> Result<Value> {
        let name = agent.name();
        let max = self.policy.max_retries;

        recorder
            .record(
                ctx.task_id,
                name,
                EventType::Start,
                format!("Agent {} started execution.", name),
                None,
            )
            .await?;

        let mut attempt: u32 = 0;
        loop {
            match agent.execute_logic(ctx, recorder).await {
                Ok(output) => {
                    recorder
                        .record(
                            ctx.task_id,
                            name,
                            EventType::Success,
                            format!("Agent {} completed successfully.", name),
                            Some(output.clone()),
                        )
                        .await?;
                    return Ok(output);
                }
                Err(AgentError::Fatal(reason)) => {
                    recorder
                        .record(
                            ctx.task_id,
                            name,
                            EventType::Error,
                            format!("Agent {} failed: {}", name, reason),
                            None,
                        )
                        .await?;
                    return Err(OrchestratorError::AgentFailed {
                        agent: name.to_string(),
                        reason,
                    });
                }
                Err(AgentError::Retryable(reason)) => {
                    attempt += 1;
                    if attempt <= max {
                        recorder
                            .record(
                                ctx.task_id,
                                name,
                                EventType::Retry,
                                format!(
                                    "Agent {} failed ({}). Retrying {}/{}...",
                                    name, reason, attempt, max
                                ),
                                None,
                            )
                            .await?;
                        sleep(self.policy.backoff(attempt)).await;
                    } else {
                        warn!(
                            agent = name,
                            task_id = %ctx.task_id,
                            "Agent exhausted its retry budget"
                        );
                        recorder
                            .record(
                                ctx.task_id,
                                name,
                                EventType::Error,
                                format!(
                                    "Agent {} failed after {} retries: {}",
                                    name, max, reason
                                ),
                                None,
                            )
                            .await?;
                        return Err(OrchestratorError::AgentFailed {
                            agent: name.to_string(),
                            reason,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use db::{create_pool, run_migrations, EventRepository, TaskRepository};
    use events::EventBus;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use taskweave_core::Task;
    use tempfile::TempDir;

    struct FlakyAgent {
        calls: Arc<AtomicU32>,
        succeed_after: u32,
    }

    #[async_trait]
    impl Agent for FlakyAgent {
        fn name(&self) -> &'static str {
            "Flaky"
        }

        async fn execute_logic(
            &self,
            _ctx: &PipelineContext,
            _recorder: &EventRecorder,
        ) -> std::result::Result<Value, AgentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.succeed_after {
                Ok(json!({"call": call}))
            } else {
                Err(AgentError::retryable("simulated outage"))
            }
        }
    }

    struct BrokenAgent;

    #[async_trait]
    impl Agent for BrokenAgent {
        fn name(&self) -> &'static str {
            "Broken"
        }

        async fn execute_logic(
            &self,
            _ctx: &PipelineContext,
            _recorder: &EventRecorder,
        ) -> std::result::Result<Value, AgentError> {
            Err(AgentError::fatal("missing predecessor output"))
        }
    }

    async fn setup() -> (PipelineContext, EventRecorder, EventRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let task = Task::new("runner test");
        TaskRepository::new(pool.clone())
            .create(&task)
            .await
            .unwrap();

        let events = EventRepository::new(pool);
        let recorder = EventRecorder::new(events.clone(), EventBus::new());
        (PipelineContext::new(task.id, "runner test"), recorder, events, temp_dir)
    }

    #[tokio::test]
    async fn test_success_emits_start_and_success() {
        let (ctx, recorder, events, _dir) = setup().await;
        let agent = FlakyAgent {
            calls: Arc::new(AtomicU32::new(0)),
            succeed_after: 1,
        };

        let runner = AgentRunner::new(RetryPolicy::default());
        let output = runner.run(&agent, &ctx, &recorder).await.unwrap();
        assert_eq!(output["call"], 1);

        let log = events.find_by_task(ctx.task_id).await.unwrap();
        let kinds: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, vec![EventType::Start, EventType::Success]);
        assert_eq!(log[1].details.as_ref().unwrap()["call"], 1);
    }

    #[tokio::test]
    async fn test_always_failing_agent_runs_max_retries_plus_one_times() {
        let (ctx, recorder, events, _dir) = setup().await;
        let calls = Arc::new(AtomicU32::new(0));
        let agent = FlakyAgent {
            calls: Arc::clone(&calls),
            succeed_after: u32::MAX,
        };

        let runner = AgentRunner::new(RetryPolicy::default());
        let err = runner.run(&agent, &ctx, &recorder).await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(matches!(err, OrchestratorError::AgentFailed { .. }));
        assert!(err.to_string().contains("simulated outage"));

        let log = events.find_by_task(ctx.task_id).await.unwrap();
        let kinds: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::Start,
                EventType::Retry,
                EventType::Retry,
                EventType::Retry,
                EventType::Error,
            ]
        );
        assert!(log[4].message.contains("failed after 3 retries"));
    }

    #[tokio::test]
    async fn test_recovers_within_retry_budget() {
        let (ctx, recorder, events, _dir) = setup().await;
        let calls = Arc::new(AtomicU32::new(0));
        let agent = FlakyAgent {
            calls: Arc::clone(&calls),
            succeed_after: 3,
        };

        let runner = AgentRunner::new(RetryPolicy::default());
        runner.run(&agent, &ctx, &recorder).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let log = events.find_by_task(ctx.task_id).await.unwrap();
        let kinds: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::Start,
                EventType::Retry,
                EventType::Retry,
                EventType::Success,
            ]
        );
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let (ctx, recorder, events, _dir) = setup().await;

        let runner = AgentRunner::new(RetryPolicy::default());
        let err = runner.run(&BrokenAgent, &ctx, &recorder).await.unwrap_err();
        assert!(err.to_string().contains("missing predecessor output"));

        let log = events.find_by_task(ctx.task_id).await.unwrap();
        let kinds: Vec<EventType> = log.iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, vec![EventType::Start, EventType::Error]);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
    }
}
