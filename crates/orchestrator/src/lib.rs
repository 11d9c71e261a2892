//! Pipeline orchestration engine for Taskweave.
//!
//! A task's pipeline is an ordered list of agent names. The orchestrator
//! resolves each name through an [`AgentRegistry`], executes the agent
//! through the retrying [`AgentRunner`], threads outputs through a shared
//! per-task context, and applies the Reviewer feedback rule with a hard
//! revision cap. Every step of the run is appended to the event log and
//! pushed onto the event bus for live subscribers.

pub mod agents;
pub mod error;
pub mod pipeline;
pub mod recorder;
pub mod registry;
pub mod runner;
pub mod state_machine;
pub mod stream;
pub mod supervisor;

pub use agents::{Agent, PlannerAgent, ResearcherAgent, ReviewerAgent, WriterAgent};
pub use error::{AgentError, OrchestratorError, Result};
pub use pipeline::{OrchestratorConfig, TaskOrchestrator, FALLBACK_REPORT};
pub use recorder::EventRecorder;
pub use registry::AgentRegistry;
pub use runner::{AgentRunner, RetryPolicy};
pub use state_machine::TaskStateMachine;
pub use stream::{subscribe, StreamItem};
pub use supervisor::PipelineSupervisor;
