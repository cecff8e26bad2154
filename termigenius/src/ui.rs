//! Terminal rendering of outcomes, reports and history.

use std::fmt::Write;

use console::style;
use termigenius_core::{ComplianceVerdict, IssueSeverity, SafetyVerdict};

use crate::{
    assistant::Outcome,
    executor::ExecutionResult,
    history::{HistoryEntry, HistoryStats},
};

#[must_use]
pub fn render_outcome(outcome: &Outcome) -> String {
    let mut out = String::new();
    match outcome {
        Outcome::Failed { error } => {
            let _ = write!(out, "{} {error}", style("Error:").red().bold());
        }
        Outcome::Rejected {
            command,
            reason,
            suggestion,
        } => {
            let _ = writeln!(out, "{} {}", style("Command:").bold(), style(command).cyan());
            let _ = write!(out, "{} {reason}", style("Blocked:").red().bold());
            if let Some(suggestion) = suggestion {
                let _ = write!(out, "\n{} {suggestion}", style("Suggestion:").yellow());
            }
        }
        Outcome::Explained {
            command,
            explanation,
        } => {
            let _ = writeln!(out, "{} {}", style("Command:").bold(), style(command).cyan());
            let _ = write!(out, "\n{}", explanation.trim_end());
        }
        Outcome::DryRun { command, warning } => {
            push_warning(&mut out, warning.as_deref());
            let _ = write!(
                out,
                "{} {}",
                style("Dry run, not executed:").bold(),
                style(command).cyan()
            );
        }
        Outcome::Cancelled { command } => {
            let _ = write!(out, "{} {command}", style("Cancelled:").yellow());
        }
        Outcome::Executed {
            command,
            warning,
            result,
        } => {
            push_warning(&mut out, warning.as_deref());
            let _ = writeln!(out, "{} {}", style("Executed:").bold(), style(command).cyan());
            out.push_str(&render_execution(result));
        }
    }
    out
}

fn push_warning(out: &mut String, warning: Option<&str>) {
    if let Some(warning) = warning {
        let _ = writeln!(out, "{} {warning}", style("Warning:").yellow().bold());
    }
}

#[must_use]
pub fn render_execution(result: &ExecutionResult) -> String {
    let mut out = String::new();
    if !result.output.is_empty() {
        let _ = writeln!(out, "{}", result.output);
    }
    if !result.error.is_empty() {
        let _ = writeln!(out, "{}", style(&result.error).red());
    }
    let status = if result.success {
        style(format!("exit code {}", result.return_code)).green()
    } else {
        style(format!("exit code {}", result.return_code)).red()
    };
    let _ = write!(out, "{status} in {:.2}s", result.execution_time);
    out
}

/// Offline report for `validate`.
#[must_use]
pub fn render_validation(compliance: &ComplianceVerdict, safety: &SafetyVerdict) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("PowerShell compliance").bold().underlined());
    let verdict = if compliance.is_valid {
        style("valid").green()
    } else {
        style("invalid").red()
    };
    let _ = writeln!(out, "  status:    {verdict}");
    let _ = writeln!(out, "  corrected: {}", compliance.corrected);
    for issue in &compliance.issues {
        let tag = match issue.severity {
            IssueSeverity::Info => style("info").blue(),
            IssueSeverity::Warning => style("warning").yellow(),
            IssueSeverity::Invalidating => style("invalid").red(),
        };
        let _ = writeln!(out, "  [{tag}] {}", issue.message);
    }

    let _ = writeln!(out, "\n{}", style("Safety").bold().underlined());
    let verdict = if safety.is_safe {
        style("safe").green()
    } else {
        style("unsafe").red()
    };
    let _ = writeln!(out, "  status:    {verdict}");
    let _ = writeln!(out, "  risk:      {}", safety.risk_level);
    if let Some(reason) = &safety.reason {
        let _ = writeln!(out, "  reason:    {reason}");
    }
    if let Some(suggestion) = &safety.suggestion {
        let _ = writeln!(out, "  suggest:   {suggestion}");
    }
    if !safety.matches.is_empty() {
        let _ = writeln!(out, "  matches:   {}", safety.matches.join(", "));
    }
    out.trim_end().to_string()
}

#[must_use]
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history entries.".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let mark = if entry.success {
            style("ok").green()
        } else {
            style("fail").red()
        };
        let _ = writeln!(
            out,
            "{} [{mark}] {}\n    {}",
            style(&entry.timestamp).dim(),
            entry.prompt,
            style(&entry.command).cyan()
        );
    }
    out.trim_end().to_string()
}

#[must_use]
pub fn render_stats(stats: &HistoryStats) -> String {
    format!(
        "total:            {}\nsuccessful:       {}\nsuccess rate:     {:.1}%\navg exec time:    {:.2}s\nmost recent:      {}",
        stats.total,
        stats.successful,
        stats.success_rate,
        stats.average_execution_time,
        stats.most_recent.as_deref().unwrap_or("(none)")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_shows_reason_and_suggestion() {
        console::set_colors_enabled(false);
        let text = render_outcome(&Outcome::Rejected {
            command: "Format-Volume -DriveLetter D".into(),
            reason: "Dangerous pattern detected: Format a volume".into(),
            suggestion: Some("Use Get-Volume".into()),
        });
        assert!(text.contains("Blocked: Dangerous pattern detected: Format a volume"));
        assert!(text.contains("Suggestion: Use Get-Volume"));
    }

    #[test]
    fn executed_shows_output_and_exit_code() {
        console::set_colors_enabled(false);
        let text = render_outcome(&Outcome::Executed {
            command: "Get-Date".into(),
            warning: None,
            result: ExecutionResult {
                success: true,
                output: "Sunday".into(),
                error: String::new(),
                return_code: 0,
                execution_time: 0.25,
            },
        });
        assert!(text.contains("Executed: Get-Date"));
        assert!(text.contains("Sunday"));
        assert!(text.ends_with("exit code 0 in 0.25s"));
    }

    #[test]
    fn validation_report_lists_issues() {
        console::set_colors_enabled(false);
        let compliance = termigenius_core::powershell::validate("ls");
        let safety = termigenius_core::safety::validate("ls", false);
        let text = render_validation(&compliance, &safety);
        assert!(text.contains("corrected: Get-ChildItem"));
        assert!(text.contains("[info] replaced alias 'ls' with 'Get-ChildItem'"));
        assert!(text.contains("status:    safe"));
    }

    #[test]
    fn empty_history() {
        assert_eq!(render_history(&[]), "No history entries.");
    }
}
