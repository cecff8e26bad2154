//! Interactive prompts.
//!
//! Everything that waits on the user goes through [`Prompter`] so that the
//! orchestration can be driven by scripted answers in tests.

use std::{collections::VecDeque, sync::Mutex};

use requestty::{DefaultSeparator, ErrorKind, Question};

use crate::{config::ResetMode, Error, Result};

pub trait Prompter: Send + Sync {
    /// Ask a yes/no question.
    ///
    /// # Errors
    /// Will return `Err` when interact error
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Read one line. `None` means the input ended (Ctrl-D / Ctrl-C).
    ///
    /// # Errors
    /// Will return `Err` when interact error
    fn input(&self, message: &str) -> Result<Option<String>>;

    /// Ask how to reset the configuration. `None` means cancel.
    ///
    /// # Errors
    /// Will return `Err` when interact error
    fn select_reset_mode(&self) -> Result<Option<ResetMode>>;
}

/// [`Prompter`] backed by the terminal.
pub struct RealPrompter;

impl Prompter for RealPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let answer = match requestty::prompt_one(
            Question::confirm("confirm")
                .message(message)
                .default(default)
                .build(),
        ) {
            Ok(answer) => answer,
            Err(ErrorKind::Interrupted | ErrorKind::Eof) => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        answer
            .as_bool()
            .ok_or_else(|| Error::Prompt("confirmation answer is empty".into()))
    }

    fn input(&self, message: &str) -> Result<Option<String>> {
        let answer = match requestty::prompt_one(Question::input("input").message(message).build())
        {
            Ok(answer) => answer,
            Err(ErrorKind::Interrupted | ErrorKind::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(answer.as_string().map(String::from))
    }

    fn select_reset_mode(&self) -> Result<Option<ResetMode>> {
        let answer = match requestty::prompt_one(
            Question::raw_select("reset")
                .message("Reset will restore all settings to their defaults. Select how to continue...")
                .choices(vec![
                    "Yes, override the current configuration".into(),
                    "Override and backup the existing file".into(),
                    DefaultSeparator,
                    "Cancel Or ^C".into(),
                ])
                .build(),
        ) {
            Ok(answer) => answer,
            Err(ErrorKind::Interrupted | ErrorKind::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match answer.as_list_item().map(|item| item.index) {
            Some(0) => Ok(Some(ResetMode::Override)),
            Some(1) => Ok(Some(ResetMode::Backup)),
            Some(_) => Ok(None),
            None => Err(Error::Prompt("select option is empty".into())),
        }
    }
}

/// Scripted [`Prompter`] for tests. Answers are consumed in order; once a
/// queue is empty, confirmations decline and input ends.
#[derive(Debug, Default)]
pub struct MockPrompter {
    pub confirms: Mutex<VecDeque<bool>>,
    pub inputs: Mutex<VecDeque<String>>,
    pub reset_mode: Option<ResetMode>,
    /// Every message shown to the user, in order.
    pub asked: Mutex<Vec<String>>,
}

impl MockPrompter {
    #[must_use]
    pub fn confirming(answers: &[bool]) -> Self {
        Self {
            confirms: Mutex::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_inputs<S: AsRef<str>>(mut self, inputs: &[S]) -> Self {
        self.inputs = Mutex::new(inputs.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    #[must_use]
    pub fn asked_messages(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    fn record(&self, message: &str) {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
    }
}

impl Prompter for MockPrompter {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        self.record(message);
        Ok(self
            .confirms
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(false))
    }

    fn input(&self, message: &str) -> Result<Option<String>> {
        self.record(message);
        Ok(self.inputs.lock().ok().and_then(|mut q| q.pop_front()))
    }

    fn select_reset_mode(&self) -> Result<Option<ResetMode>> {
        self.record("reset");
        Ok(self.reset_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_answers_in_order_then_declines() {
        let prompter = MockPrompter::confirming(&[true, false]);
        assert!(prompter.confirm("first?", false).unwrap());
        assert!(!prompter.confirm("second?", true).unwrap());
        assert!(!prompter.confirm("third?", true).unwrap());
        assert_eq!(prompter.asked_messages(), vec!["first?", "second?", "third?"]);
    }

    #[test]
    fn mock_input_ends() {
        let prompter = MockPrompter::default().with_inputs(&["list files"]);
        assert_eq!(prompter.input("> ").unwrap().as_deref(), Some("list files"));
        assert_eq!(prompter.input("> ").unwrap(), None);
    }
}
