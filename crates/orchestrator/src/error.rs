use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Agent {0} not found in registry")]
    UnknownAgent(String),

    #[error("Agent {agent} failed: {reason}")]
    AgentFailed { agent: String, reason: String },

    #[error("Revision cap exceeded: the feedback loop requested more than {cap} revisions")]
    RevisionCapExceeded { cap: u32 },

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Invalid task status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Outcome of one invocation of an agent's core logic.
///
/// Retryable failures are retried by the runner up to its ceiling; fatal
/// failures (a missing predecessor output, malformed state) propagate
/// immediately since retrying cannot change them.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{0}")]
    Retryable(String),

    #[error("{0}")]
    Fatal(String),
}

impl AgentError {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal(reason.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<db::DbError> for AgentError {
    fn from(err: db::DbError) -> Self {
        Self::Fatal(err.to_string())
    }
}
