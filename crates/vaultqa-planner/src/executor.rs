use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use vaultqa_core::{
    ExecutionResult, Plan, PlanStatus, PlanningConfig, SubTask, SubTaskStatus, SubtaskSummary,
};
use vaultqa_llm::{ChatMessage, TextGenerator};
use vaultqa_prompts::{build_subtask_prompt, build_synthesis_prompt};
use vaultqa_tools::ToolRegistry;

use crate::resolve::resolve_parameters;

pub const DEPENDENCIES_NOT_SATISFIED: &str = "Dependencies not satisfied";

/// Runs a plan's sub-tasks in declaration order and synthesizes an answer.
pub struct Executor {
    generator: Arc<dyn TextGenerator>,
    tools: Arc<ToolRegistry>,
    config: PlanningConfig,
}

impl Executor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tools: Arc<ToolRegistry>,
        config: PlanningConfig,
    ) -> Self {
        Self {
            generator,
            tools,
            config,
        }
    }

    /// Execute `plan` and return it with every visited sub-task in a
    /// terminal state. Failures are recorded on the sub-tasks, never returned.
    ///
    /// The plan ends `completed` unless strict mode aborted it on a failed
    /// tool-backed sub-task, in which case it ends `failed` and later
    /// sub-tasks stay `pending`.
    pub async fn execute_plan(&self, mut plan: Plan, question: &str) -> ExecutionResult {
        info!(
            goal = %plan.goal,
            subtasks = plan.subtasks.len(),
            mode = %self.config.verification_mode,
            "executing plan"
        );
        plan.status = PlanStatus::Executing;
        let mut results: BTreeMap<u32, SubtaskSummary> = BTreeMap::new();

        for task in plan.subtasks.iter_mut() {
            if task.status != SubTaskStatus::Pending {
                debug!(id = task.id, status = %task.status, "skipping sub-task already visited");
                continue;
            }

            if !dependencies_satisfied(task, &results) {
                warn!(id = task.id, dependencies = ?task.dependencies, "dependencies not satisfied");
                task.mark_failed(DEPENDENCIES_NOT_SATISFIED);
                results.insert(task.id, SubtaskSummary::from(&*task));
                continue;
            }

            info!(id = task.id, description = %task.description, "running sub-task");
            self.run_subtask(task, &results).await;
            results.insert(task.id, SubtaskSummary::from(&*task));

            match task.status {
                SubTaskStatus::Completed => info!(id = task.id, "sub-task completed"),
                _ => warn!(id = task.id, error = task.error.as_deref().unwrap_or(""), "sub-task failed"),
            }

            if task.status == SubTaskStatus::Failed && task.tool.is_some() && self.config.is_strict() {
                warn!(id = task.id, "strict verification: aborting plan");
                plan.status = PlanStatus::Failed;
                break;
            }
        }

        if plan.status != PlanStatus::Failed {
            plan.status = PlanStatus::Completed;
        }

        let final_answer = self.synthesize(&plan, &results, question).await;
        let success = plan.status == PlanStatus::Completed;
        let result = ExecutionResult {
            plan,
            subtask_results: results,
            final_answer,
            success,
        };
        info!(
            status = %result.plan.status,
            completed = result.completed_count(),
            failed = result.failed_count(),
            total = result.plan.subtasks.len(),
            "plan execution finished"
        );
        result
    }

    /// Run one pending sub-task to a terminal state.
    pub async fn run_subtask(&self, task: &mut SubTask, results: &BTreeMap<u32, SubtaskSummary>) {
        task.mark_running();

        let Some(tool_name) = task.tool.clone() else {
            let prompt = build_subtask_prompt(task, results);
            match self.generator.generate(&[ChatMessage::user(prompt)]).await {
                Ok(text) => task.mark_completed(text),
                Err(e) => task.mark_failed(e.to_string()),
            }
            return;
        };

        let Some(tool) = self.tools.get(&tool_name) else {
            task.mark_failed(format!("Tool '{tool_name}' not available"));
            return;
        };

        let params = resolve_parameters(&task.parameters, results);
        debug!(
            id = task.id,
            tool = %tool_name,
            params = %serde_json::Value::Object(params.clone()),
            "resolved tool parameters"
        );

        let attempts = self.config.tool_attempts();
        for attempt in 1..=attempts {
            match tool.invoke(&params).await {
                Ok(output) => {
                    task.mark_completed(output);
                    return;
                }
                Err(e) if attempt < attempts => {
                    warn!(id = task.id, tool = %tool_name, attempt, attempts, error = %e, "tool call failed, retrying");
                }
                Err(e) => {
                    task.mark_failed(e.to_string());
                    return;
                }
            }
        }
    }

    async fn synthesize(
        &self,
        plan: &Plan,
        results: &BTreeMap<u32, SubtaskSummary>,
        question: &str,
    ) -> String {
        let prompt = build_synthesis_prompt(question, plan, results);
        match self.generator.generate(&[ChatMessage::user(prompt)]).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "final answer synthesis failed");
                fallback_answer(results)
            }
        }
    }
}

fn dependencies_satisfied(task: &SubTask, results: &BTreeMap<u32, SubtaskSummary>) -> bool {
    task.dependencies
        .iter()
        .all(|dep| results.get(dep).is_some_and(|s| s.is_completed()))
}

/// Answer used when synthesis fails.
pub fn fallback_answer(results: &BTreeMap<u32, SubtaskSummary>) -> String {
    let completed = results.values().filter(|s| s.is_completed()).count();
    format!("Execution finished with {completed} completed sub-task(s).")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vaultqa_core::VerificationMode;
    use vaultqa_llm::MockGenerator;
    use vaultqa_tools::{Tool, ToolDefinition, ToolError, ToolParams};

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Tool for Flaky {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "flaky".into(),
                description: "fails a few times".into(),
                input_schema: json!({"type": "object"}),
            }
        }

        async fn invoke(&self, _params: &ToolParams) -> Result<String, ToolError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(ToolError::Failed(format!("attempt {} failed", n + 1)))
            } else {
                Ok("ok".into())
            }
        }
    }

    fn executor(
        mock: Arc<MockGenerator>,
        tool: Option<Arc<Flaky>>,
        retries: u32,
    ) -> Executor {
        let mut registry = ToolRegistry::new();
        if let Some(tool) = tool {
            registry.register(tool);
        }
        let config = PlanningConfig {
            max_retries_per_task: retries,
            verification_mode: VerificationMode::Flexible,
            ..PlanningConfig::default()
        };
        Executor::new(mock, Arc::new(registry), config)
    }

    fn flaky(failures: usize) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures,
            calls: AtomicUsize::new(0),
        })
    }

    fn tool_task(id: u32) -> SubTask {
        SubTask::new(id, "flaky step", "ok").with_tool("flaky", ToolParams::new())
    }

    #[tokio::test]
    async fn retry_succeeds_within_attempts() {
        let tool = flaky(1);
        let exec = executor(Arc::new(MockGenerator::always("answer")), Some(tool.clone()), 2);
        let mut task = tool_task(1);
        exec.run_subtask(&mut task, &BTreeMap::new()).await;
        assert_eq!(task.status, SubTaskStatus::Completed);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_still_attempts_once() {
        let tool = flaky(0);
        let exec = executor(Arc::new(MockGenerator::always("answer")), Some(tool.clone()), 0);
        let mut task = tool_task(1);
        exec.run_subtask(&mut task, &BTreeMap::new()).await;
        assert_eq!(task.status, SubTaskStatus::Completed);
        assert_eq!(tool.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn last_error_is_recorded() {
        let tool = flaky(5);
        let exec = executor(Arc::new(MockGenerator::always("answer")), Some(tool.clone()), 3);
        let mut task = tool_task(1);
        exec.run_subtask(&mut task, &BTreeMap::new()).await;
        assert_eq!(task.status, SubTaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("attempt 3 failed"));
    }

    #[tokio::test]
    async fn missing_tool_fails_without_retry() {
        let exec = executor(Arc::new(MockGenerator::always("answer")), None, 2);
        let mut task = SubTask::new(1, "read", "x").with_tool("read_section", ToolParams::new());
        exec.run_subtask(&mut task, &BTreeMap::new()).await;
        assert_eq!(task.status, SubTaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("Tool 'read_section' not available"));
    }

    #[tokio::test]
    async fn no_tool_uses_generator() {
        let mock = Arc::new(MockGenerator::always("summary"));
        let exec = executor(mock.clone(), None, 2);
        let mut task = SubTask::new(2, "Summarize", "summary");
        let prior = BTreeMap::from([(
            1,
            SubtaskSummary {
                description: "read".into(),
                status: SubTaskStatus::Completed,
                result: Some("note body".into()),
                error: None,
            },
        )]);
        exec.run_subtask(&mut task, &prior).await;
        assert_eq!(task.result.as_deref(), Some("summary"));
        assert!(mock.prompt(0).unwrap().contains("Task 1: note body"));
    }

    #[tokio::test]
    async fn no_tool_generation_error_is_recorded() {
        let exec = executor(Arc::new(MockGenerator::failing("model offline")), None, 2);
        let mut task = SubTask::new(1, "Answer", "answer");
        exec.run_subtask(&mut task, &BTreeMap::new()).await;
        assert_eq!(task.status, SubTaskStatus::Failed);
        assert!(task.error.unwrap().contains("model offline"));
    }

    #[tokio::test]
    async fn synthesis_failure_reports_completed_count() {
        let mock = Arc::new(MockGenerator::failing("offline").then_reply("step done"));
        let exec = executor(mock, None, 2);
        let plan = Plan::new("g", vec![SubTask::new(1, "Answer", "answer")]).unwrap();
        let result = exec.execute_plan(plan, "q").await;
        assert!(result.success);
        assert_eq!(
            result.final_answer,
            "Execution finished with 1 completed sub-task(s)."
        );
    }

    #[tokio::test]
    async fn already_terminal_subtasks_are_skipped() {
        let mock = Arc::new(MockGenerator::always("answer"));
        let exec = executor(mock.clone(), None, 2);
        let mut done = SubTask::new(1, "done", "x");
        done.mark_running();
        done.mark_completed("earlier".into());
        let plan = Plan::new("g", vec![done]).unwrap();
        let result = exec.execute_plan(plan, "q").await;
        // Only the synthesis call reaches the model.
        assert_eq!(mock.calls(), 1);
        assert!(result.subtask_results.is_empty());
    }
}
