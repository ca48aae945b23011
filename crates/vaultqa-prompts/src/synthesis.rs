use std::collections::BTreeMap;

use vaultqa_core::{Plan, SubtaskSummary};

/// Characters of each sub-task result quoted in the synthesis prompt.
pub const EXCERPT_CHARS: usize = 200;

/// First [`EXCERPT_CHARS`] characters of `text`, with `...` appended only
/// when something was cut.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Final-answer prompt built from every completed sub-task with a non-empty result.
pub fn build_synthesis_prompt(
    question: &str,
    plan: &Plan,
    results: &BTreeMap<u32, SubtaskSummary>,
) -> String {
    let mut prompt = format!("Original question: {question}\n\nGoal: {}\n\n", plan.goal);
    prompt.push_str("Sub-task results:\n");
    for (id, summary) in results {
        let Some(result) = summary.result.as_deref().filter(|r| !r.is_empty()) else {
            continue;
        };
        if !summary.is_completed() {
            continue;
        }
        prompt.push_str(&format!(
            "- Task {id}: {}\n  Result: {}\n",
            summary.description,
            excerpt(result)
        ));
    }
    prompt.push_str(
        "\nCombine this information into a clear and concise answer to the original question.",
    );
    prompt
}
