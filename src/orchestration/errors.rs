use super::events::StageEvent;
use super::states::WorkflowStage;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on {event:?}")]
    InvalidTransition {
        from: WorkflowStage,
        event: StageEvent,
    },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
