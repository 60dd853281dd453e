//! Rendering of prior task results into prompt text.

use crate::domain::{ResultsMap, TaskId};

pub const DEPENDENCY_HEADER: &str = "**Here is the previously collected information:**";

/// `**Task:** <name>\n**Result:** <result>`
pub fn result_block(name: &str, result: &str) -> String {
    format!("**Task:** {name}\n**Result:** {result}")
}

/// Render the results of `dependencies` that are already recorded.
///
/// Ids without a recorded result are skipped. An empty dependency list
/// renders as the empty string; a non-empty one always carries the header.
pub fn render_dependencies(dependencies: &[TaskId], results: &ResultsMap) -> String {
    if dependencies.is_empty() {
        return String::new();
    }

    let mut rendered = format!("{DEPENDENCY_HEADER}\n");
    for result in dependencies.iter().filter_map(|id| results.get(*id)) {
        rendered.push_str(&result_block(&result.name, &result.result));
        rendered.push_str("\n\n");
    }
    rendered.trim_end().to_string()
}

/// All recorded results as blocks separated by a blank line, in insertion order.
pub fn render_all(results: &ResultsMap) -> String {
    results
        .iter()
        .map(|r| result_block(&r.name, &r.result))
        .collect::<Vec<_>>()
        .join("\n\n")
}
