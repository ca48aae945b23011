//! Prompt assembly for the planner and executor. Everything here is pure
//! string building; no model is called.

pub mod planner;
pub mod subtask;
pub mod synthesis;

pub use planner::{build_planner_prompt, build_planner_user_message};
pub use subtask::build_subtask_prompt;
pub use synthesis::{build_synthesis_prompt, excerpt, EXCERPT_CHARS};
