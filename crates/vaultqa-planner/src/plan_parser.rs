use serde::Deserialize;
use thiserror::Error;
use vaultqa_core::subtask::Parameters;
use vaultqa_core::{CoreError, Plan, SubTask};

#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("plan is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] CoreError),
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    goal: String,
    subtasks: Vec<RawSubTask>,
}

#[derive(Debug, Deserialize)]
struct RawSubTask {
    id: u32,
    description: String,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    parameters: Option<Parameters>,
    expected_outcome: String,
    #[serde(default)]
    dependencies: Option<Vec<u32>>,
}

impl From<RawSubTask> for SubTask {
    fn from(raw: RawSubTask) -> Self {
        let task = SubTask::new(raw.id, raw.description, raw.expected_outcome)
            .with_dependencies(raw.dependencies.unwrap_or_default());
        match raw.tool {
            Some(tool) => task.with_tool(tool, raw.parameters.unwrap_or_default()),
            None => SubTask {
                parameters: raw.parameters.unwrap_or_default(),
                ..task
            },
        }
    }
}

/// Remove a surrounding markdown code fence, with or without a language tag.
/// Anything after the opening fence on its first line is kept.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }
    if let Some(stripped) = text.trim_end().strip_suffix("```") {
        text = stripped;
    }
    text.trim()
}

/// Decode a model reply into a pending [`Plan`].
pub fn parse_plan_response(raw: &str) -> Result<Plan, PlanParseError> {
    let parsed: RawPlan = serde_json::from_str(strip_code_fence(raw))?;
    let subtasks = parsed.subtasks.into_iter().map(SubTask::from).collect();
    Ok(Plan::new(parsed.goal, subtasks)?)
}
