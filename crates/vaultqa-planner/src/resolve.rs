use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use vaultqa_core::subtask::Parameters;
use vaultqa_core::SubtaskSummary;

static EXACT_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from_task_(\d+)$").expect("valid back-reference pattern"));

static LOOSE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)task[_\s]*(\d+)").expect("valid back-reference pattern"));

const REFERENCE_PUNCTUATION: &[char] = &['$', '(', ')', '[', ']', '{', '}'];

/// Replace back-references to earlier sub-tasks with their results.
///
/// `from_task_N` is the documented form. Values such as `$(task_2)` or
/// `{task 2}` are accepted as a fallback. A reference to a sub-task that has
/// not completed, and anything that is not a string, passes through as is.
pub fn resolve_parameters(
    parameters: &Parameters,
    results: &BTreeMap<u32, SubtaskSummary>,
) -> Parameters {
    parameters
        .iter()
        .map(|(key, value)| {
            let resolved = match value {
                Value::String(s) => referenced_task(s)
                    .and_then(|id| completed_result(id, results))
                    .map(Value::String)
                    .unwrap_or_else(|| value.clone()),
                other => other.clone(),
            };
            (key.clone(), resolved)
        })
        .collect()
}

fn referenced_task(value: &str) -> Option<u32> {
    if let Some(caps) = EXACT_REFERENCE.captures(value) {
        return caps[1].parse().ok();
    }
    if value.to_lowercase().contains("task") && value.contains(REFERENCE_PUNCTUATION) {
        return LOOSE_REFERENCE
            .captures(value)
            .and_then(|caps| caps[1].parse().ok());
    }
    None
}

/// The result of sub-task `id` if it completed. Multi-line results are
/// reduced to their first line.
fn completed_result(id: u32, results: &BTreeMap<u32, SubtaskSummary>) -> Option<String> {
    let summary = results.get(&id).filter(|s| s.is_completed())?;
    let result = summary.result.as_deref()?;
    if result.contains('\n') {
        Some(result.split('\n').next().unwrap_or_default().trim().to_string())
    } else {
        Some(result.to_string())
    }
}
