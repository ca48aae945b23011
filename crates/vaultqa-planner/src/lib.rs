pub mod executor;
pub mod module;
pub mod plan_parser;
pub mod planner;
pub mod resolve;

pub use executor::Executor;
pub use module::{AgentModule, PlannerExecutorModule};
pub use plan_parser::{parse_plan_response, strip_code_fence, PlanParseError};
pub use planner::{PlanGenerationError, Planner};
pub use resolve::resolve_parameters;
