//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Console output
//! - `mock` - Scripted answers for tests
//! - This module - The [Prompter] seam and its terminal implementation

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::{MergeError, Result};

pub mod formatter;
pub mod mock;

pub use formatter::{
    display_boundary_warning, display_error, display_info, display_message, display_notice,
    display_success, display_unexpected, display_warning,
};
pub use mock::MockPrompter;

/// Interactive decisions the workflow needs from the operator
pub trait Prompter {
    /// Ask a yes/no question.
    ///
    /// # Arguments
    /// * `prompt` - The question, without any "(y/N)" suffix
    /// * `default` - Answer used when the operator just presses Enter
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Let the operator pick one candidate.
    ///
    /// `source` maps the operator's filter text to the candidate list and may
    /// be called any number of times. Returns the chosen candidate.
    fn select(&self, message: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String>;
}

impl<P: Prompter + ?Sized> Prompter for &P {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        (**self).confirm(prompt, default)
    }

    fn select(&self, message: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        (**self).select(message, source)
    }
}

/// Terminal prompts backed by `dialoguer`
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        DialoguerPrompter {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_error(e: dialoguer::Error) -> MergeError {
    MergeError::prompt(e.to_string())
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    /// Two steps instead of live autocomplete: the operator types a filter
    /// line, `source` runs once on it, then the matches are offered in a
    /// list. An empty filter lists everything; no match or Esc asks again.
    fn select(&self, message: &str, source: &dyn Fn(&str) -> Vec<String>) -> Result<String> {
        loop {
            let filter: String = Input::with_theme(&self.theme)
                .with_prompt(format!("{} (filter, Enter for all)", message))
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?;

            let candidates = source(filter.trim());
            if candidates.is_empty() {
                formatter::display_warning(&format!("nothing matches '{}'", filter.trim()));
                continue;
            }

            let chosen = Select::with_theme(&self.theme)
                .with_prompt(message)
                .items(&candidates)
                .default(0)
                .interact_opt()
                .map_err(prompt_error)?;

            // Esc goes back to filtering
            if let Some(index) = chosen {
                return Ok(candidates[index].clone());
            }
        }
    }
}
