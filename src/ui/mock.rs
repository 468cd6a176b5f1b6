use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{MergeError, Result};
use crate::ui::Prompter;

/// Prompter answering from a script, for tests
///
/// `select` applies the configured filter text and picks the first candidate.
/// `confirm` pops the next queued answer, falling back to the prompt's default.
pub struct MockPrompter {
    filter: String,
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl MockPrompter {
    /// Select the first candidate matching `filter`
    pub fn selecting(filter: impl Into<String>) -> Self {
        MockPrompter {
            filter: filter.into(),
            answers: RefCell::new(VecDeque::new()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Queue answers for upcoming confirmations
    pub fn answering(self, answers: &[bool]) -> Self {
        self.answers.borrow_mut().extend(answers.iter().copied());
        self
    }

    /// Every confirmation prompt shown, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for MockPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(default))
    }

    fn select(&self, _message: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        source(&self.filter)
            .into_iter()
            .next()
            .ok_or_else(|| MergeError::prompt(format!("no candidate matches '{}'", self.filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_uses_queue_then_default() {
        let prompter = MockPrompter::selecting("").answering(&[true]);
        assert!(prompter.confirm("first?", false).unwrap());
        assert!(!prompter.confirm("second?", false).unwrap());
        assert!(prompter.confirm("third?", true).unwrap());
        assert_eq!(prompter.asked(), vec!["first?", "second?", "third?"]);
    }

    #[test]
    fn test_select_filters_candidates() {
        let prompter = MockPrompter::selecting("b");
        let source = |needle: &str| {
            ["apple", "banana", "cherry"]
                .iter()
                .filter(|c| c.contains(needle))
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(prompter.select("pick", &source).unwrap(), "banana");
    }

    #[test]
    fn test_borrowed_prompter_keeps_history() {
        fn ask(prompter: impl Prompter) -> bool {
            prompter.confirm("go on?", false).unwrap()
        }

        let prompter = MockPrompter::selecting("").answering(&[true]);
        assert!(ask(&prompter));
        assert_eq!(prompter.asked(), vec!["go on?"]);
    }

    #[test]
    fn test_select_without_match_is_error() {
        let prompter = MockPrompter::selecting("zzz");
        let source = |_: &str| Vec::<String>::new();
        assert!(prompter.select("pick", &source).is_err());
    }
}
