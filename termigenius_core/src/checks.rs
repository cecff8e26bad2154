//! Safety check patterns
//!
//! Checks are regex patterns grouped by shell family (`base`, `cmd`,
//! `powershell`). They are stored as YAML under the crate `checks` folder and
//! embedded at build time.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::Result;

/// String with all checks from `checks` folder (prepared in build.rs) in YAML format.
const ALL_CHECKS: &str = include_str!(concat!(env!("OUT_DIR"), "/all-checks.yaml"));

/// Severity levels for risky patterns
///
/// The natural ordering (`Info < Low < Medium < High < Critical`) is used when
/// reporting the risk of a command. `Critical` checks are the dangerous
/// patterns that always block a command.
#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Describes a single command safety check
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Check {
    /// Unique identifier for this check
    pub id: String,
    /// Regular expression pattern to test the command against
    #[serde(with = "serde_regex")]
    pub test: Regex,
    /// Human-readable description of what makes this command risky
    pub description: String,
    /// The group this check belongs to (`base`, `cmd`, `powershell`)
    pub from: String,
    /// Severity of the risky pattern
    #[serde(default)]
    pub severity: Severity,
    /// Safer way to reach the same goal, shown as a suggestion
    #[serde(default)]
    pub alternative: Option<String>,
}

impl Check {
    /// Dangerous checks block a command at every safety level.
    #[must_use]
    pub fn is_dangerous(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Return all built-in check patterns
///
/// # Errors
/// Returns an error when there's a problem parsing the embedded YAML checks
pub fn get_all_checks() -> Result<Vec<Check>> {
    Ok(serde_yaml::from_str(ALL_CHECKS)?)
}

/// Return a cached reference to all built-in check patterns.
///
/// The YAML is parsed and regexes are compiled once, on first call.
pub(crate) fn builtin_checks() -> &'static [Check] {
    static CHECKS: OnceLock<Vec<Check>> = OnceLock::new();
    CHECKS.get_or_init(|| get_all_checks().expect("built-in checks are valid YAML"))
}

/// Return the checks that match the given command, in declaration order.
#[must_use]
pub fn run_check_on_command<'a>(checks: &'a [Check], command: &str) -> Vec<&'a Check> {
    checks
        .iter()
        .filter(|check| check.test.is_match(command))
        .collect()
}
