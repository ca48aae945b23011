use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use vaultqa_core::{AgentState, PlanningConfig};
use vaultqa_llm::TextGenerator;
use vaultqa_tools::ToolRegistry;

use crate::executor::Executor;
use crate::planner::Planner;

pub const NO_ANSWER: &str = "No answer generated";

/// A stage of the question-answering agent. Modules read and enrich the
/// request-scoped [`AgentState`].
#[async_trait]
pub trait AgentModule: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    fn enable(&mut self) {
        self.set_enabled(true);
    }

    fn disable(&mut self) {
        self.set_enabled(false);
    }

    async fn initialize(&self) {}

    async fn process(&self, state: AgentState) -> AgentState;
}

/// Plans a question, executes the plan and writes the plan, its results and
/// the final answer back into the state.
pub struct PlannerExecutorModule {
    planner: Planner,
    executor: Executor,
    config: PlanningConfig,
    enabled: bool,
}

impl PlannerExecutorModule {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tools: Arc<ToolRegistry>,
        config: PlanningConfig,
    ) -> Self {
        let planner = Planner::new(generator.clone(), tools.definitions(), config.max_subtasks);
        let executor = Executor::new(generator, tools, config.clone());
        Self {
            planner,
            executor,
            config,
            enabled: true,
        }
    }

    /// Run one question through the module and return only the answer.
    pub async fn ask(&self, question: &str) -> String {
        self.process(AgentState::new(question))
            .await
            .answer
            .unwrap_or_else(|| NO_ANSWER.to_string())
    }
}

#[async_trait]
impl AgentModule for PlannerExecutorModule {
    fn name(&self) -> &str {
        "PlannerExecutorModule"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    async fn initialize(&self) {
        info!(
            module = self.name(),
            max_subtasks = self.config.max_subtasks,
            max_retries_per_task = self.config.max_retries_per_task,
            verification_mode = %self.config.verification_mode,
            "initializing module"
        );
    }

    async fn process(&self, mut state: AgentState) -> AgentState {
        if !self.enabled {
            debug!(module = self.name(), "module disabled, passing state through");
            return state;
        }

        let plan = self.planner.generate_plan(&state.question).await;
        let result = self.executor.execute_plan(plan, &state.question).await;
        state.answer = Some(result.final_answer.clone());
        state.plan = Some(result.plan.clone());
        state.planning_results = Some(result);
        state
    }
}
