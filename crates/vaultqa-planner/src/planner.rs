use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use vaultqa_core::Plan;
use vaultqa_llm::{ChatMessage, LlmError, TextGenerator};
use vaultqa_prompts::{build_planner_prompt, build_planner_user_message};
use vaultqa_tools::ToolDefinition;

use crate::plan_parser::{parse_plan_response, PlanParseError};

#[derive(Debug, Error)]
pub enum PlanGenerationError {
    #[error("plan generation call failed: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

/// Turns a question into a [`Plan`] with one text-generation call.
pub struct Planner {
    generator: Arc<dyn TextGenerator>,
    tools: Vec<ToolDefinition>,
    max_subtasks: usize,
}

impl Planner {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tools: Vec<ToolDefinition>,
        max_subtasks: usize,
    ) -> Self {
        Self {
            generator,
            tools,
            max_subtasks,
        }
    }

    /// Always returns a plan. Any generation or decode failure yields
    /// [`Plan::fallback`].
    pub async fn generate_plan(&self, question: &str) -> Plan {
        info!(question, "generating plan");
        match self.try_generate_plan(question).await {
            Ok(plan) => {
                log_plan(&plan, self.max_subtasks);
                plan
            }
            Err(e) => {
                warn!(error = %e, "plan generation failed, using single-step fallback");
                Plan::fallback(question)
            }
        }
    }

    pub async fn try_generate_plan(&self, question: &str) -> Result<Plan, PlanGenerationError> {
        let messages = [
            ChatMessage::system(build_planner_prompt(&self.tools, self.max_subtasks)),
            ChatMessage::user(build_planner_user_message(question)),
        ];
        let raw = self.generator.generate(&messages).await?;
        Ok(parse_plan_response(&raw)?)
    }
}

fn log_plan(plan: &Plan, max_subtasks: usize) {
    info!(goal = %plan.goal, subtasks = plan.subtasks.len(), "plan generated");
    for task in &plan.subtasks {
        info!(
            id = task.id,
            description = %task.description,
            tool = task.tool.as_deref().unwrap_or("-"),
            parameters = %serde_json::Value::Object(task.parameters.clone()),
            dependencies = ?task.dependencies,
            expected = %task.expected_outcome,
            "plan step"
        );
    }
    if plan.subtasks.len() > max_subtasks {
        warn!(
            subtasks = plan.subtasks.len(),
            max_subtasks, "plan exceeds the configured sub-task count"
        );
    }
    for issue in plan.dependency_issues() {
        warn!(%issue, "unsatisfiable dependency in plan");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultqa_llm::MockGenerator;

    const PLAN: &str = r#"```json
{"goal": "Find TODO", "subtasks": [
  {"id": 1, "description": "Search", "tool": "search_notes",
   "parameters": {"keyword": "TODO"}, "expected_outcome": "path", "dependencies": []}
]}
```"#;

    fn planner(mock: Arc<MockGenerator>) -> Planner {
        Planner::new(mock, Vec::new(), 10)
    }

    #[tokio::test]
    async fn decodes_model_plan() {
        let mock = Arc::new(MockGenerator::always(PLAN));
        let plan = planner(mock.clone()).generate_plan("find my todo").await;
        assert_eq!(plan.goal, "Find TODO");
        assert_eq!(plan.subtasks[0].tool.as_deref(), Some("search_notes"));

        let request = &mock.requests()[0];
        assert_eq!(request.len(), 2);
        assert!(request[0].content.contains("from_task_X"));
        assert!(request[1].content.starts_with("Question: find my todo"));
    }

    #[tokio::test]
    async fn garbage_falls_back() {
        let mock = Arc::new(MockGenerator::always("I cannot help with that."));
        let plan = planner(mock).generate_plan("what is urgent?").await;
        assert_eq!(plan.subtasks.len(), 1);
        assert!(plan.subtasks[0].tool.is_none());
        assert!(plan.subtasks[0].dependencies.is_empty());
        assert_eq!(plan.goal, "what is urgent?");
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let mock = Arc::new(MockGenerator::failing("connection refused"));
        let plan = planner(mock).generate_plan("q").await;
        assert_eq!(plan.subtasks.len(), 1);
        assert_eq!(plan.subtasks[0].expected_outcome, "answer the question directly");
    }

    #[tokio::test]
    async fn try_generate_surfaces_errors() {
        let mock = Arc::new(MockGenerator::always("{}"));
        let err = planner(mock).try_generate_plan("q").await.unwrap_err();
        assert!(matches!(err, PlanGenerationError::Parse(_)));
    }
}
