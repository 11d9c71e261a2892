use taskweave_core::TaskStatus;

use crate::error::{OrchestratorError, Result};

pub struct TaskStateMachine;

impl TaskStateMachine {
    pub fn validate_transition(from: &TaskStatus, to: &TaskStatus) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &TaskStatus) -> Vec<TaskStatus> {
        match from {
            TaskStatus::Pending => vec![TaskStatus::InProgress],
            TaskStatus::InProgress => vec![TaskStatus::Completed, TaskStatus::Failed],
            TaskStatus::Completed | TaskStatus::Failed => vec![],
        }
    }

    pub fn can_transition(from: &TaskStatus, to: &TaskStatus) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::InProgress
        ));
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::InProgress,
            &TaskStatus::Completed
        ));
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::InProgress,
            &TaskStatus::Failed
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Completed
        ));
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Failed
        ));
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::InProgress,
            &TaskStatus::Pending
        ));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [TaskStatus::Completed, TaskStatus::Failed] {
            for target in [
                TaskStatus::Pending,
                TaskStatus::InProgress,
                TaskStatus::Completed,
                TaskStatus::Failed,
            ] {
                assert!(!TaskStateMachine::can_transition(&terminal, &target));
            }
        }
    }
}
