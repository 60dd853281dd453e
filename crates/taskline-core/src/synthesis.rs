//! Final-answer mode selection and the manager-free answer paths.

use serde::{Deserialize, Serialize};

use crate::context::render_all;
use crate::domain::ResultsMap;

/// How the final answer is produced from recorded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalAnswerMode {
    /// Every result block, in insertion order.
    Concatenate,
    /// The raw result of the highest task id.
    LastTask,
    /// Manager-written summary of all results.
    Summarize,
}

impl FinalAnswerMode {
    pub fn from_flags(use_summarizer: bool, summarize_all_answers: bool) -> Self {
        match (use_summarizer, summarize_all_answers) {
            (false, _) => FinalAnswerMode::Concatenate,
            (true, false) => FinalAnswerMode::LastTask,
            (true, true) => FinalAnswerMode::Summarize,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FinalAnswerMode::Concatenate => "concatenate",
            FinalAnswerMode::LastTask => "last_task",
            FinalAnswerMode::Summarize => "summarize",
        }
    }
}

/// Answer without calling the manager, when the mode allows it.
///
/// `LastTask` with no recorded results yields `None`, as does `Summarize`;
/// both then need the manager.
pub fn local_answer(mode: FinalAnswerMode, results: &ResultsMap) -> Option<String> {
    match mode {
        FinalAnswerMode::Concatenate => Some(render_all(results)),
        FinalAnswerMode::LastTask => results.highest_id().map(|r| r.result.clone()),
        FinalAnswerMode::Summarize => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskResult;

    fn results() -> ResultsMap {
        let mut map = ResultsMap::new();
        for (id, name, body) in [(1, "A", "x"), (2, "B", "y")] {
            map.record(TaskResult {
                id,
                name: name.to_string(),
                result: body.to_string(),
            })
            .unwrap();
        }
        map
    }

    #[test]
    fn test_mode_precedence() {
        assert_eq!(
            FinalAnswerMode::from_flags(false, true),
            FinalAnswerMode::Concatenate
        );
        assert_eq!(
            FinalAnswerMode::from_flags(true, false),
            FinalAnswerMode::LastTask
        );
        assert_eq!(
            FinalAnswerMode::from_flags(true, true),
            FinalAnswerMode::Summarize
        );
    }

    #[test]
    fn test_concatenate() {
        assert_eq!(
            local_answer(FinalAnswerMode::Concatenate, &results()).unwrap(),
            "**Task:** A\n**Result:** x\n\n**Task:** B\n**Result:** y"
        );
    }

    #[test]
    fn test_last_task_uses_highest_id() {
        let mut map = ResultsMap::new();
        map.record(TaskResult {
            id: 4,
            name: "late id".to_string(),
            result: "highest".to_string(),
        })
        .unwrap();
        map.record(TaskResult {
            id: 2,
            name: "recorded last".to_string(),
            result: "lower".to_string(),
        })
        .unwrap();
        assert_eq!(
            local_answer(FinalAnswerMode::LastTask, &map).as_deref(),
            Some("highest")
        );
        assert_eq!(
            local_answer(FinalAnswerMode::LastTask, &results()).as_deref(),
            Some("y")
        );
    }

    #[test]
    fn test_manager_needed_cases() {
        assert!(local_answer(FinalAnswerMode::LastTask, &ResultsMap::new()).is_none());
        assert!(local_answer(FinalAnswerMode::Summarize, &results()).is_none());
    }
}
