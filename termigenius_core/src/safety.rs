//! General safety validation
//!
//! [`CommandValidator`] runs the embedded [`Check`] patterns against a command
//! and, depending on the [`SafetyLevel`], decides whether it is safe to run.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    checks::{builtin_checks, run_check_on_command, Check, Severity},
    command::{base_command, split_command},
    Error, Result,
};

/// Commands that only read state. At [`SafetyLevel::High`] every command
/// segment must start with one of these or with a read-only verb.
const SAFE_COMMANDS: &[&str] = &[
    "ls", "cat", "head", "tail", "grep", "find", "locate", "which", "echo", "printf", "date",
    "cal", "uptime", "whoami", "pwd", "history", "alias", "type", "file", "stat", "wc", "sort",
    "uniq", "cut", "tr", "sed", "awk", "less", "more", "man", "info", "help", "ps", "top", "htop",
    "df", "du", "free", "git", "python", "python3", "pip", "npm", "node", "write-output",
    "write-host",
];

/// PowerShell verbs whose cmdlets do not change system state.
const READ_ONLY_VERBS: &[&str] = &[
    "get",
    "test",
    "select",
    "where",
    "sort",
    "measure",
    "format",
    "compare",
    "find",
    "search",
    "resolve",
    "show",
    "read",
    "group",
    "convertto",
    "convertfrom",
];

/// How strictly commands are judged
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    /// Only dangerous patterns block a command
    Low,
    /// Risky patterns are reported but allowed
    #[default]
    Medium,
    /// Risky patterns block, and only read-only commands are allowed
    High,
}

impl FromStr for SafetyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(Error::InvalidSafetyLevel {
                level: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a safety validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    pub reason: Option<String>,
    pub suggestion: Option<String>,
    pub risk_level: Severity,
    /// Ids of the checks that matched, dangerous ones first
    pub matches: Vec<String>,
}

impl SafetyVerdict {
    fn safe() -> Self {
        Self {
            is_safe: true,
            reason: None,
            suggestion: None,
            risk_level: Severity::Low,
            matches: vec![],
        }
    }

    fn unsafe_because(reason: String, risk_level: Severity) -> Self {
        Self {
            is_safe: false,
            reason: Some(reason),
            suggestion: None,
            risk_level,
            matches: vec![],
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    fn with_matches(mut self, matches: &[&Check]) -> Self {
        self.matches = matches.iter().map(|c| c.id.clone()).collect();
        self
    }
}

/// Validates commands against a set of safety checks
#[derive(Debug, Clone)]
pub struct CommandValidator<'a> {
    checks: &'a [Check],
    level: SafetyLevel,
}

impl CommandValidator<'static> {
    /// Validator using the built-in checks.
    #[must_use]
    pub fn new(level: SafetyLevel) -> Self {
        Self {
            checks: builtin_checks(),
            level,
        }
    }
}

impl<'a> CommandValidator<'a> {
    #[must_use]
    pub const fn with_checks(checks: &'a [Check], level: SafetyLevel) -> Self {
        Self { checks, level }
    }

    /// Decide whether `command` is safe to execute.
    ///
    /// `strict_mode` raises the effective level to [`SafetyLevel::High`].
    #[must_use]
    pub fn validate(&self, command: &str, strict_mode: bool) -> SafetyVerdict {
        let command = command.trim();
        if command.is_empty() {
            return SafetyVerdict::unsafe_because("Empty command".to_string(), Severity::Low);
        }

        let matches = run_check_on_command(self.checks, command);
        let (dangerous, warnings): (Vec<&Check>, Vec<&Check>) =
            matches.into_iter().partition(|c| c.is_dangerous());

        if let Some(check) = dangerous.first() {
            tracing::debug!(check = %check.id, "dangerous pattern matched");
            let suggestion = check.alternative.clone().unwrap_or_else(|| {
                "Review the command carefully or use a safer alternative".to_string()
            });
            let all: Vec<&Check> = dangerous.iter().chain(warnings.iter()).copied().collect();
            return SafetyVerdict::unsafe_because(
                format!("Dangerous pattern detected: {}", check.description),
                Severity::Critical,
            )
            .with_suggestion(suggestion)
            .with_matches(&all);
        }

        let level = if strict_mode {
            SafetyLevel::High
        } else {
            self.level
        };
        tracing::debug!(%level, warnings = warnings.len(), "evaluating command");

        match level {
            SafetyLevel::High => {
                if let Some(check) = warnings.first() {
                    return SafetyVerdict::unsafe_because(
                        format!("Potentially risky command detected: {}", check.description),
                        Severity::High,
                    )
                    .with_suggestion(check.alternative.clone().unwrap_or_else(|| {
                        "Lower the safety level to run risky commands".to_string()
                    }))
                    .with_matches(&warnings);
                }
                for segment in split_command(command) {
                    let Some(base) = base_command(&segment) else {
                        continue;
                    };
                    if !is_read_only(&base) {
                        return SafetyVerdict::unsafe_because(
                            format!("Command '{base}' not in safe command list"),
                            Severity::Medium,
                        )
                        .with_suggestion(
                            "Use a lower safety level to run commands that change the system",
                        );
                    }
                }
                SafetyVerdict::safe()
            }
            SafetyLevel::Medium => match warnings.first() {
                Some(check) => {
                    let mut verdict = SafetyVerdict::safe().with_matches(&warnings);
                    verdict.reason = Some(format!(
                        "Potentially risky command detected: {}",
                        check.description
                    ));
                    verdict.suggestion = check.alternative.clone();
                    verdict.risk_level = Severity::Medium;
                    verdict
                }
                None => SafetyVerdict::safe(),
            },
            SafetyLevel::Low => SafetyVerdict::safe(),
        }
    }
}

/// Validate `command` with the built-in checks at the default level.
#[must_use]
pub fn validate(command: &str, strict_mode: bool) -> SafetyVerdict {
    CommandValidator::new(SafetyLevel::default()).validate(command, strict_mode)
}

fn is_read_only(base: &str) -> bool {
    if SAFE_COMMANDS.contains(&base) {
        return true;
    }
    base.split_once('-')
        .is_some_and(|(verb, noun)| !noun.is_empty() && READ_ONLY_VERBS.contains(&verb))
}
