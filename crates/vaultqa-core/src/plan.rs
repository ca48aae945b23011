use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::subtask::{SubTask, SubTaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Pending,
    Executing,
    Completed,
    Failed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Executing => "executing",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PlanStatus::Pending),
            "executing" => Some(PlanStatus::Executing),
            "completed" => Some(PlanStatus::Completed),
            "failed" => Some(PlanStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency edge that can never be satisfied by an in-order walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyIssue {
    /// The referenced id does not exist in the plan.
    Dangling { subtask: u32, dependency: u32 },
    SelfReference { subtask: u32 },
    /// The referenced sub-task is declared later, so it cannot have
    /// completed by the time this one is visited.
    ForwardReference { subtask: u32, dependency: u32 },
}

impl fmt::Display for DependencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyIssue::Dangling { subtask, dependency } => {
                write!(f, "sub-task {subtask} depends on unknown sub-task {dependency}")
            }
            DependencyIssue::SelfReference { subtask } => {
                write!(f, "sub-task {subtask} depends on itself")
            }
            DependencyIssue::ForwardReference { subtask, dependency } => {
                write!(
                    f,
                    "sub-task {subtask} depends on sub-task {dependency} declared after it"
                )
            }
        }
    }
}

/// The decomposition of one question into ordered sub-tasks.
///
/// A plan exclusively owns its sub-tasks and lives for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub subtasks: Vec<SubTask>,
    pub created_at: DateTime<Utc>,
    pub status: PlanStatus,
}

impl Plan {
    /// Build a pending plan. Rejects an empty sub-task list and ids that
    /// are zero or repeated. Dependency problems are tolerated; see
    /// [`Plan::dependency_issues`].
    pub fn new(goal: impl Into<String>, subtasks: Vec<SubTask>) -> Result<Self, CoreError> {
        if subtasks.is_empty() {
            return Err(CoreError::InvalidPlan("plan has no sub-tasks".into()));
        }
        let mut seen = HashSet::new();
        for task in &subtasks {
            if task.id == 0 {
                return Err(CoreError::InvalidPlan(
                    "sub-task ids must be positive".into(),
                ));
            }
            if !seen.insert(task.id) {
                return Err(CoreError::InvalidPlan(format!(
                    "duplicate sub-task id {}",
                    task.id
                )));
            }
        }
        Ok(Self {
            goal: goal.into(),
            subtasks,
            created_at: Utc::now(),
            status: PlanStatus::Pending,
        })
    }

    /// The single-step plan used whenever plan generation fails.
    pub fn fallback(question: &str) -> Self {
        Self {
            goal: question.to_string(),
            subtasks: vec![SubTask::new(
                1,
                "Answer the question directly",
                "answer the question directly",
            )],
            created_at: Utc::now(),
            status: PlanStatus::Pending,
        }
    }

    pub fn count_with_status(&self, status: SubTaskStatus) -> usize {
        self.subtasks.iter().filter(|t| t.status == status).count()
    }

    /// Every dependency edge an in-order walk can never satisfy.
    pub fn dependency_issues(&self) -> Vec<DependencyIssue> {
        let position: HashMap<u32, usize> = self
            .subtasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();

        let mut issues = Vec::new();
        for (index, task) in self.subtasks.iter().enumerate() {
            for &dep in &task.dependencies {
                if dep == task.id {
                    issues.push(DependencyIssue::SelfReference { subtask: task.id });
                    continue;
                }
                match position.get(&dep) {
                    None => issues.push(DependencyIssue::Dangling {
                        subtask: task.id,
                        dependency: dep,
                    }),
                    Some(&dep_index) if dep_index > index => {
                        issues.push(DependencyIssue::ForwardReference {
                            subtask: task.id,
                            dependency: dep,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        issues
    }
}
