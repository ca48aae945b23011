use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plan::Plan;
use crate::subtask::{SubTask, SubTaskStatus};

/// Snapshot of a sub-task once it has reached a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskSummary {
    pub description: String,
    pub status: SubTaskStatus,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl SubtaskSummary {
    pub fn is_completed(&self) -> bool {
        self.status == SubTaskStatus::Completed
    }
}

impl From<&SubTask> for SubtaskSummary {
    fn from(task: &SubTask) -> Self {
        Self {
            description: task.description.clone(),
            status: task.status,
            result: task.result.clone(),
            error: task.error.clone(),
        }
    }
}

/// Everything one plan execution produced. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub plan: Plan,
    /// Keyed by sub-task id, in id order.
    pub subtask_results: BTreeMap<u32, SubtaskSummary>,
    pub final_answer: String,
    /// `plan.status == completed`.
    pub success: bool,
}

impl ExecutionResult {
    pub fn completed_count(&self) -> usize {
        self.subtask_results.values().filter(|s| s.is_completed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.subtask_results
            .values()
            .filter(|s| s.status == SubTaskStatus::Failed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanStatus;

    #[test]
    fn test_summary_from_subtask() {
        let mut task = SubTask::new(3, "search", "paths");
        task.mark_running();
        task.mark_failed("boom");
        let summary = SubtaskSummary::from(&task);
        assert_eq!(summary.description, "search");
        assert_eq!(summary.status, SubTaskStatus::Failed);
        assert_eq!(summary.error.as_deref(), Some("boom"));
        assert!(!summary.is_completed());
    }

    #[test]
    fn test_counts() {
        let mut ok = SubTask::new(1, "a", "a");
        ok.mark_running();
        ok.mark_completed("x".into());
        let mut bad = SubTask::new(2, "b", "b");
        bad.mark_failed("Dependencies not satisfied");

        let mut plan = Plan::new("g", vec![ok.clone(), bad.clone()]).unwrap();
        plan.status = PlanStatus::Completed;
        let result = ExecutionResult {
            subtask_results: [(1, SubtaskSummary::from(&ok)), (2, SubtaskSummary::from(&bad))]
                .into_iter()
                .collect(),
            plan,
            final_answer: "done".into(),
            success: true,
        };
        assert_eq!(result.completed_count(), 1);
        assert_eq!(result.failed_count(), 1);
    }
}
