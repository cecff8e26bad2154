//! PowerShell compliance checker
//!
//! Decides whether a command is a native PowerShell invocation. Aliases are
//! rewritten into canonical cmdlets, while legacy CMD tokens, relative paths,
//! unknown verbs and abbreviated parameters are reported as [`Issue`]s.
//!
//! ```
//! use termigenius_core::validate_powershell_command;
//!
//! let (is_valid, message, corrected) = validate_powershell_command("gci C:\\Users");
//! assert!(is_valid);
//! assert_eq!(message, "replaced alias 'gci' with 'Get-ChildItem'");
//! assert_eq!(corrected, "Get-ChildItem C:\\Users");
//! ```

pub mod rewrite;
pub mod rules;
pub mod tables;

use serde::Serialize;

use rules::RULES;

const VALID_MESSAGE: &str = "Valid PowerShell command";

/// How much an issue weighs on the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// The command was rewritten
    Info,
    /// Style problem, the command still runs
    Warning,
    /// The command must not run as is
    Invalidating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub rule: &'static str,
    pub severity: IssueSeverity,
    pub message: String,
}

impl Issue {
    #[must_use]
    pub fn new(rule: &'static str, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
        }
    }
}

/// Result of a compliance check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceVerdict {
    pub is_valid: bool,
    pub message: String,
    pub corrected: String,
    pub issues: Vec<Issue>,
}

impl ComplianceVerdict {
    fn from_issues(issues: Vec<Issue>, corrected: String) -> Self {
        let is_valid = !issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Invalidating);
        let message = if issues.is_empty() {
            VALID_MESSAGE.to_string()
        } else {
            issues
                .iter()
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        };
        Self {
            is_valid,
            message,
            corrected,
            issues,
        }
    }

    #[must_use]
    pub fn into_tuple(self) -> (bool, String, String) {
        (self.is_valid, self.message, self.corrected)
    }
}

/// Run every compliance rule against `command`.
#[must_use]
pub fn validate(command: &str) -> ComplianceVerdict {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return ComplianceVerdict {
            is_valid: false,
            message: "Empty command".to_string(),
            corrected: String::new(),
            issues: vec![],
        };
    }

    let mut corrected = trimmed.to_string();
    let mut issues = Vec::new();
    for rule in RULES {
        let found = rule.apply(trimmed, &mut corrected);
        if !found.is_empty() {
            tracing::debug!(rule = rule.id(), count = found.len(), "rule reported issues");
        }
        if rule.stop_on_match() && !found.is_empty() {
            return ComplianceVerdict::from_issues(found, command.to_string());
        }
        issues.extend(found);
    }

    ComplianceVerdict::from_issues(issues, corrected)
}

/// Validate `command` and return `(is_valid, message, corrected)`.
#[must_use]
pub fn validate_powershell_command(command: &str) -> (bool, String, String) {
    validate(command).into_tuple()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn empty_command(#[case] command: &str) {
        assert_eq!(
            validate_powershell_command(command),
            (false, "Empty command".to_string(), String::new())
        );
    }

    #[rstest]
    #[case("dir C:\\Users")]
    #[case("DIR C:\\Users")]
    #[case("  copy a.txt b.txt  ")]
    #[case("Get-ChildItem C:\\ | findstr foo")]
    #[case("gci .\\x; del C:\\y")]
    fn forbidden_token_returns_input_untouched(#[case] command: &str) {
        let verdict = validate(command);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.corrected, command);
        assert_eq!(verdict.issues.len(), 1);
        assert!(verdict.message.starts_with("Legacy CMD command '"));
    }

    #[test]
    fn alias_is_rewritten_and_reported() {
        let (is_valid, message, corrected) = validate_powershell_command("ps");
        assert!(is_valid);
        assert_eq!(message, "replaced alias 'ps' with 'Get-Process'");
        assert_eq!(corrected, "Get-Process");
    }

    #[rstest]
    #[case("Get-ChildItem -Path C:\\Users")]
    #[case("Get-Process | Sort-Object -Property CPU -Descending | Select-Object -First 5")]
    #[case("Get-Service -Name Spooler")]
    #[case("Start-Service -Name Spooler")]
    fn valid_commands(#[case] command: &str) {
        let (is_valid, message, corrected) = validate_powershell_command(command);
        assert!(is_valid);
        assert_eq!(message, "Valid PowerShell command");
        assert_eq!(corrected, command);
    }

    #[test]
    fn unknown_verb_is_invalid() {
        let (is_valid, message, _) = validate_powershell_command("Frobnicate-Item -Path C:\\x");
        assert!(!is_valid);
        assert!(message.contains("Frobnicate"));
    }

    #[test]
    fn relative_path_after_alias_rewrite() {
        let verdict = validate("gci ~\\Desktop");
        assert!(!verdict.is_valid);
        assert_eq!(verdict.corrected, "Get-ChildItem ~\\Desktop");
        assert_eq!(
            verdict.message,
            "replaced alias 'gci' with 'Get-ChildItem'; \
             Relative path pattern '~\\' detected - use absolute paths"
        );
    }

    #[test]
    fn relative_dot_path_is_flagged() {
        let (is_valid, message, _) = validate_powershell_command("Get-Content .\\file.txt");
        assert!(!is_valid);
        assert!(message.contains("Relative path pattern '.\\'"));
    }

    #[test]
    fn short_parameter_only_warns() {
        let verdict = validate("Get-ChildItem -r");
        assert!(verdict.is_valid);
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].severity, IssueSeverity::Warning);
        assert_eq!(
            verdict.message,
            "PowerShell parameters should use full names (e.g., -Path, not -p)"
        );
    }

    #[test]
    fn issues_accumulate_across_rules() {
        let verdict = validate("Zap-Thing .\\a -f");
        assert!(!verdict.is_valid);
        let rules: Vec<&str> = verdict.issues.iter().map(|i| i.rule).collect();
        assert_eq!(rules, vec!["relative_path", "verb_noun", "parameter_names"]);
    }

    #[test]
    fn corrected_is_trimmed() {
        let (_, _, corrected) = validate_powershell_command("  Get-Date  ");
        assert_eq!(corrected, "Get-Date");
    }

    proptest! {
        #[test]
        fn never_panics(command in ".*") {
            let (is_valid, message, _) = validate_powershell_command(&command);
            if command.trim().is_empty() {
                prop_assert!(!is_valid);
                prop_assert_eq!(message, "Empty command");
            } else {
                prop_assert!(!message.is_empty());
            }
        }

        #[test]
        fn revalidating_a_valid_correction_is_stable(
            words in prop::collection::vec(
                prop::sample::select(vec![
                    "gci", "ls", "ps", "cat", "kill", "start", "ri", "Get-ChildItem",
                    "Start-Service", "-Name", "-r", "C:\\Users", "$ls", "|", ";",
                    "Where-Object", "{", "}", "Zap-It", "%TEMP%", "file.ps",
                ]),
                1..8,
            )
        ) {
            let command = words.join(" ");
            let first = validate(&command);
            if first.is_valid {
                let second = validate(&first.corrected);
                prop_assert!(second.is_valid);
                prop_assert_eq!(&second.corrected, &first.corrected);
                prop_assert!(second.issues.iter().all(|i| i.severity != IssueSeverity::Info));
            }
        }
    }
}
