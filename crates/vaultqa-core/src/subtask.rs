use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named arguments for a tool call. Values are literals or `from_task_<N>`
/// back-references that the executor resolves before invocation.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl SubTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubTaskStatus::Pending => "pending",
            SubTaskStatus::Running => "running",
            SubTaskStatus::Completed => "completed",
            SubTaskStatus::Failed => "failed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubTaskStatus::Pending),
            "running" => Some(SubTaskStatus::Running),
            "completed" => Some(SubTaskStatus::Completed),
            "failed" => Some(SubTaskStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubTaskStatus::Completed | SubTaskStatus::Failed)
    }

    /// Allowed moves: `pending -> running`, `running -> completed|failed`,
    /// and `pending -> failed` for sub-tasks skipped on unmet dependencies.
    pub fn can_transition_to(&self, next: SubTaskStatus) -> bool {
        matches!(
            (self, next),
            (SubTaskStatus::Pending, SubTaskStatus::Running)
                | (SubTaskStatus::Pending, SubTaskStatus::Failed)
                | (SubTaskStatus::Running, SubTaskStatus::Completed)
                | (SubTaskStatus::Running, SubTaskStatus::Failed)
        )
    }
}

impl fmt::Display for SubTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work within a [`Plan`](crate::Plan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    /// Positive id, unique within its plan.
    pub id: u32,
    pub description: String,
    /// Registered tool name. `None` means the step is answered by text
    /// generation over the results gathered so far.
    pub tool: Option<String>,
    pub parameters: Parameters,
    /// Free text, only used when prompting.
    pub expected_outcome: String,
    /// Ids that must be `completed` before this sub-task may run.
    pub dependencies: BTreeSet<u32>,
    pub status: SubTaskStatus,
    /// Set only when `completed`.
    pub result: Option<String>,
    /// Set only when `failed`.
    pub error: Option<String>,
}

impl SubTask {
    pub fn new(id: u32, description: impl Into<String>, expected_outcome: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            tool: None,
            parameters: Parameters::new(),
            expected_outcome: expected_outcome.into(),
            dependencies: BTreeSet::new(),
            status: SubTaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>, parameters: Parameters) -> Self {
        let tool = tool.into();
        self.tool = if tool.trim().is_empty() { None } else { Some(tool) };
        self.parameters = parameters;
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = u32>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == SubTaskStatus::Completed
    }

    pub fn mark_running(&mut self) {
        self.transition(SubTaskStatus::Running);
    }

    pub fn mark_completed(&mut self, result: String) {
        self.transition(SubTaskStatus::Completed);
        self.result = Some(result);
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.transition(SubTaskStatus::Failed);
        self.result = None;
        self.error = Some(error.into());
    }

    fn transition(&mut self, next: SubTaskStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "sub-task {}: illegal transition {} -> {}",
            self.id,
            self.status,
            next
        );
        self.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_str_round_trip() {
        let all = [
            SubTaskStatus::Pending,
            SubTaskStatus::Running,
            SubTaskStatus::Completed,
            SubTaskStatus::Failed,
        ];
        for s in all {
            assert_eq!(SubTaskStatus::parse_str(s.as_str()), Some(s));
        }
        assert_eq!(SubTaskStatus::parse_str("done"), None);
    }

    #[test]
    fn test_transitions() {
        use SubTaskStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Failed));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Failed.can_transition_to(Running));
        assert!(!Completed.can_transition_to(Failed));
    }

    #[test]
    fn test_mark_completed_sets_result_only() {
        let mut t = SubTask::new(1, "read", "content");
        t.mark_running();
        t.mark_completed("body".into());
        assert_eq!(t.status, SubTaskStatus::Completed);
        assert_eq!(t.result.as_deref(), Some("body"));
        assert!(t.error.is_none());
        assert!(t.status.is_terminal());
    }

    #[test]
    fn test_mark_failed_from_pending() {
        let mut t = SubTask::new(2, "read", "content").with_dependencies([1]);
        t.mark_failed("Dependencies not satisfied");
        assert_eq!(t.status, SubTaskStatus::Failed);
        assert_eq!(t.error.as_deref(), Some("Dependencies not satisfied"));
        assert!(t.result.is_none());
    }

    #[test]
    fn test_empty_tool_name_means_no_tool() {
        let t = SubTask::new(1, "answer", "answer").with_tool("  ", Parameters::new());
        assert!(t.tool.is_none());
    }
}
