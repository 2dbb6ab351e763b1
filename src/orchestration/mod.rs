//! # Orchestration
//!
//! The question-answering workflow as an explicit stage machine.
//!
//! - [`WorkflowStage`] and [`StageEvent`]: the vocabulary of the machine
//! - [`determine_next_stage`]: the full transition table
//! - [`WorkflowState`]: everything known about one question so far
//! - [`WorkflowOrchestrator`]: runs stages against a completion client, a schema cache
//!   and a database gateway

pub mod errors;
pub mod events;
pub mod sql_text;
pub mod state;
pub mod states;
pub mod transitions;
pub mod types;
pub mod workflow;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::StageEvent;
pub use state::WorkflowState;
pub use states::WorkflowStage;
pub use transitions::{determine_next_stage, repair_allowed};
pub use types::{AnalystStats, AskResponse, ErrorCategory, StageTransition};
pub use workflow::{WorkflowOrchestrator, WorkflowSettings};
