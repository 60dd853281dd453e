//! Bounded retry with feedback accumulation.
//!
//! [`FeedbackLoop`] owns an attempt budget and a prompt. The caller drives it
//! with `while let Some(attempt) = lp.next_attempt()`, and every failure it
//! [`absorb`](FeedbackLoop::absorb)s is appended to the prompt so the next
//! attempt sees what went wrong.

use std::fmt;

const FEEDBACK_PREFIX: &str = "\nError occurred: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackLoop {
    max_attempts: u32,
    attempts: u32,
    prompt: String,
    last_failure: Option<String>,
}

impl FeedbackLoop {
    pub fn new(max_attempts: u32, prompt: impl Into<String>) -> Self {
        Self {
            max_attempts,
            attempts: 0,
            prompt: prompt.into(),
            last_failure: None,
        }
    }

    /// Start the next attempt. Returns its 1-based number, or `None` once the
    /// budget is spent.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    /// Prompt including all feedback absorbed so far.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Record a failed attempt and fold it into the prompt.
    pub fn absorb(&mut self, failure: &impl fmt::Display) {
        let note = failure.to_string();
        self.prompt.push_str(FEEDBACK_PREFIX);
        self.prompt.push_str(&note);
        self.last_failure = Some(note);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}
