use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Whether a failed tool-backed sub-task aborts the rest of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    Strict,
    #[default]
    Flexible,
}

impl VerificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMode::Strict => "strict",
            VerificationMode::Flexible => "flexible",
        }
    }
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(VerificationMode::Strict),
            "flexible" => Ok(VerificationMode::Flexible),
            other => Err(CoreError::InvalidInput(format!(
                "unknown verification mode: {other}"
            ))),
        }
    }
}

/// Planner / executor limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Advertised to the planner prompt; not enforced at runtime.
    pub max_subtasks: usize,
    /// Total tool attempts per sub-task, not retries after the first.
    pub max_retries_per_task: u32,
    pub verification_mode: VerificationMode,
    /// Carried for configuration compatibility; re-planning is not performed.
    pub enable_replanning: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_subtasks: 10,
            max_retries_per_task: 2,
            verification_mode: VerificationMode::Flexible,
            enable_replanning: true,
        }
    }
}

impl PlanningConfig {
    /// Number of tool attempts actually made. A configured zero still
    /// gets one attempt.
    pub fn tool_attempts(&self) -> u32 {
        self.max_retries_per_task.max(1)
    }

    pub fn is_strict(&self) -> bool {
        self.verification_mode == VerificationMode::Strict
    }
}
