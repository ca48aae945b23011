use std::collections::BTreeMap;

use vaultqa_core::{SubTask, SubtaskSummary};

/// Prompt for a sub-task with no tool: the results of every completed
/// sub-task so far, then the current description and expected outcome.
pub fn build_subtask_prompt(subtask: &SubTask, completed: &BTreeMap<u32, SubtaskSummary>) -> String {
    let mut prompt = String::from("Context from previous sub-tasks:\n");
    for (id, summary) in completed {
        if !summary.is_completed() {
            continue;
        }
        let result = summary.result.as_deref().unwrap_or("");
        prompt.push_str(&format!("Task {id}: {result}\n"));
    }
    prompt.push('\n');
    prompt.push_str(&format!("Current sub-task: {}\n", subtask.description));
    prompt.push_str(&format!("Expected outcome: {}\n\n", subtask.expected_outcome));
    prompt.push_str("Produce the result for this sub-task based on the context.");
    prompt
}
