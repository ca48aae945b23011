use serde::{Deserialize, Serialize};

use crate::execution::ExecutionResult;
use crate::plan::Plan;

/// Request-scoped state handed from module to module by the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub question: String,
    pub plan: Option<Plan>,
    pub planning_results: Option<ExecutionResult>,
    pub answer: Option<String>,
}

impl AgentState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}
