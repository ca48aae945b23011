pub mod config;
pub mod error;
pub mod execution;
pub mod plan;
pub mod state;
pub mod subtask;

pub use config::{PlanningConfig, VerificationMode};
pub use error::CoreError;
pub use execution::{ExecutionResult, SubtaskSummary};
pub use plan::{DependencyIssue, Plan, PlanStatus};
pub use state::AgentState;
pub use subtask::{SubTask, SubTaskStatus};
