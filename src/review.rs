//! Review step: each answered prompt paired with the question it answers.

use crate::config::PromptBinding;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItem {
    pub question: String,
    pub answer: String,
}

/// Trim and collapse whitespace runs (newlines included) to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ReviewItem {
    /// `None` for a blank answer. The heading is the binding's configured
    /// question, else the toggle's rendered text, else the prompt id.
    pub fn from_prompt(binding: &PromptBinding, toggle_text: Option<&str>, answer: &str) -> Option<Self> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        let question = [binding.question.as_deref(), toggle_text]
            .into_iter()
            .flatten()
            .map(collapse_whitespace)
            .find(|q| !q.is_empty())
            .unwrap_or_else(|| binding.prompt.clone());
        Some(Self { question, answer: answer.to_owned() })
    }
}
