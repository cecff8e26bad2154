//! Turns a natural-language request into an executed PowerShell command.
//!
//! The flow is generate, safety-validate, then explain, preview or confirm
//! and execute. Every side effect goes through the injected
//! [`Environment`], [`LlmProvider`] and [`Prompter`].

use std::time::Duration;

use termigenius_core::CommandValidator;
use tracing::{debug, warn};

use crate::{
    config::Settings,
    context::SystemContext,
    dialog::Prompter,
    env::Environment,
    executor::ExecutionResult,
    history::{History, HistoryEntry},
    llm::LlmProvider,
    Result,
};

const EXIT_WORDS: &[&str] = &["quit", "exit", "bye"];

/// Per-request switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Explain the command instead of running it
    pub explain: bool,
    /// Show the command without running it
    pub dry_run: bool,
    /// Validate at the highest safety level regardless of settings
    pub strict: bool,
}

/// What happened to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No command could be produced
    Failed { error: String },
    /// The safety validator refused the command
    Rejected {
        command: String,
        reason: String,
        suggestion: Option<String>,
    },
    Explained { command: String, explanation: String },
    DryRun {
        command: String,
        warning: Option<String>,
    },
    /// The user declined to run the command
    Cancelled { command: String },
    Executed {
        command: String,
        warning: Option<String>,
        result: ExecutionResult,
    },
}

impl Outcome {
    /// The generated command, when one was produced.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Failed { .. } => None,
            Self::Rejected { command, .. }
            | Self::Explained { command, .. }
            | Self::DryRun { command, .. }
            | Self::Cancelled { command }
            | Self::Executed { command, .. } => Some(command),
        }
    }
}

pub struct Assistant<'a> {
    settings: &'a Settings,
    env: &'a dyn Environment,
    provider: &'a dyn LlmProvider,
    prompter: &'a dyn Prompter,
    history: History,
}

impl<'a> Assistant<'a> {
    #[must_use]
    pub fn new(
        settings: &'a Settings,
        env: &'a dyn Environment,
        provider: &'a dyn LlmProvider,
        prompter: &'a dyn Prompter,
        history: History,
    ) -> Self {
        Self {
            settings,
            env,
            provider,
            prompter,
            history,
        }
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Handle one request from generation to execution.
    pub fn process_prompt(&self, prompt: &str, options: Options) -> Outcome {
        let ctx = SystemContext::collect(self.env);

        let command = match self.provider.generate_command(prompt, &ctx) {
            Ok(command) => command,
            Err(err) => {
                warn!(error = %err, "command generation failed");
                return Outcome::Failed {
                    error: err.to_string(),
                };
            }
        };
        debug!(command, "command generated");

        let verdict =
            CommandValidator::new(self.settings.safety_level).validate(&command, options.strict);
        if !verdict.is_safe {
            debug!(matches = ?verdict.matches, "command rejected");
            return Outcome::Rejected {
                command,
                reason: verdict.reason.unwrap_or_default(),
                suggestion: verdict.suggestion,
            };
        }
        let warning = verdict.reason;

        if options.explain {
            return match self.provider.explain_command(&command, &ctx) {
                Ok(explanation) => Outcome::Explained {
                    command,
                    explanation,
                },
                Err(err) => Outcome::Failed {
                    error: err.to_string(),
                },
            };
        }

        if options.dry_run {
            return Outcome::DryRun { command, warning };
        }

        if !self.settings.auto_confirm {
            let message = warning.as_ref().map_or_else(
                || format!("Execute `{command}`?"),
                |w| format!("{w}. Execute `{command}` anyway?"),
            );
            match self.prompter.confirm(&message, false) {
                Ok(true) => {}
                Ok(false) => return Outcome::Cancelled { command },
                Err(err) => {
                    return Outcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        }

        let cwd = self.env.current_dir().ok();
        let result = self.env.execute(
            &command,
            Duration::from_secs(self.settings.timeout_secs),
            cwd.as_deref(),
        );
        self.record(prompt, &command, &result);

        Outcome::Executed {
            command,
            warning,
            result,
        }
    }

    /// Read requests until an exit word or the end of input, handing each
    /// outcome to `on_outcome`. Returns how many requests were processed.
    ///
    /// # Errors
    /// Will return `Err` when reading input fails
    pub fn chat(&self, options: Options, mut on_outcome: impl FnMut(&Outcome)) -> Result<usize> {
        let mut processed = 0;
        while let Some(line) = self.prompter.input("termigenius>")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
                break;
            }
            on_outcome(&self.process_prompt(line, options));
            processed += 1;
        }
        debug!(processed, "chat session ended");
        Ok(processed)
    }

    fn record(&self, prompt: &str, command: &str, result: &ExecutionResult) {
        let entry = HistoryEntry::new(
            prompt,
            command,
            result.success,
            result.execution_time,
            result.output.len(),
        );
        if let Err(err) = self.history.add_entry(&entry) {
            warn!(error = %err, path = %self.history.path().display(), "could not write history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialog::MockPrompter, env::MockEnvironment, llm::MockLlmProvider};

    fn history() -> (tempfile::TempDir, History) {
        let temp = tempfile::tempdir().unwrap();
        let history = History::new(temp.path().join("history.jsonl"), true, 10);
        (temp, history)
    }

    #[test]
    fn declined_confirmation_cancels() {
        let (_temp, history) = history();
        let settings = Settings::default();
        let env = MockEnvironment::default();
        let provider = MockLlmProvider::responding("Get-Date");
        let prompter = MockPrompter::confirming(&[false]);
        let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

        let outcome = assistant.process_prompt("what time is it", Options::default());
        assert_eq!(
            outcome,
            Outcome::Cancelled {
                command: "Get-Date".into()
            }
        );
        assert!(env.executed_commands().is_empty());
        assert!(assistant.history().load().unwrap().is_empty());
    }

    #[test]
    fn confirmed_command_runs_and_is_recorded() {
        let (_temp, history) = history();
        let settings = Settings::default();
        let env = MockEnvironment::default();
        let provider = MockLlmProvider::responding("```powershell\ngci C:\\Temp\n```");
        let prompter = MockPrompter::confirming(&[true]);
        let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

        let outcome = assistant.process_prompt("list temp", Options::default());
        assert_eq!(outcome.command(), Some("Get-ChildItem C:\\Temp"));
        assert!(matches!(outcome, Outcome::Executed { ref result, .. } if result.success));
        assert_eq!(env.executed_commands(), vec!["Get-ChildItem C:\\Temp"]);

        let entries = assistant.history().load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "list temp");
    }

    #[test]
    fn chat_stops_on_exit_word() {
        let (_temp, history) = history();
        let settings = Settings {
            auto_confirm: true,
            ..Settings::default()
        };
        let env = MockEnvironment::default();
        let provider = MockLlmProvider::responding("Get-Date");
        let prompter = MockPrompter::default().with_inputs(&["time", "", "  BYE ", "never"]);
        let assistant = Assistant::new(&settings, &env, &provider, &prompter, history);

        let mut seen = vec![];
        let processed = assistant
            .chat(Options::default(), |o| seen.push(o.clone()))
            .unwrap();
        assert_eq!(processed, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(env.executed_commands(), vec!["Get-Date"]);
    }
}
