//! The compliance rules, in the order they run.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    rewrite::rewrite_aliases,
    tables::{is_forbidden, is_known_verb},
    Issue, IssueSeverity,
};

/// A single compliance rule.
///
/// `original` is the trimmed command as submitted, `corrected` is the
/// command as rewritten by the rules that already ran.
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;

    /// When this rule reports an issue, no further rule runs.
    fn stop_on_match(&self) -> bool {
        false
    }

    fn apply(&self, original: &str, corrected: &mut String) -> Vec<Issue>;
}

pub static RULES: &[&dyn Rule] = &[
    &ForbiddenTokens,
    &AliasRewrite,
    &RelativePaths,
    &VerbNoun,
    &ParameterNames,
];

/// Legacy CMD command used as a whitespace-delimited token.
pub struct ForbiddenTokens;

impl Rule for ForbiddenTokens {
    fn id(&self) -> &'static str {
        "forbidden_token"
    }

    fn stop_on_match(&self) -> bool {
        true
    }

    fn apply(&self, original: &str, _corrected: &mut String) -> Vec<Issue> {
        original
            .split_whitespace()
            .find(|token| is_forbidden(token))
            .map(|token| {
                vec![Issue::new(
                    self.id(),
                    IssueSeverity::Invalidating,
                    format!(
                        "Legacy CMD command '{}' detected - use PowerShell equivalent",
                        token.to_lowercase()
                    ),
                )]
            })
            .unwrap_or_default()
    }
}

/// Shorthand aliases rewritten to canonical cmdlets.
pub struct AliasRewrite;

impl Rule for AliasRewrite {
    fn id(&self) -> &'static str {
        "alias"
    }

    fn apply(&self, _original: &str, corrected: &mut String) -> Vec<Issue> {
        let rewrite = rewrite_aliases(corrected);
        *corrected = rewrite.text;
        rewrite
            .substitutions
            .into_iter()
            .map(|(alias, canonical)| {
                Issue::new(
                    self.id(),
                    IssueSeverity::Info,
                    format!("replaced alias '{alias}' with '{canonical}'"),
                )
            })
            .collect()
    }
}

static RELATIVE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (r".\", r"\.\\"),
        (r"..\", r"\.\.\\"),
        (r"~\", r"~\\"),
        ("$env:", r"(?i)\$env:"),
        ("%VAR%", r"%\w+%"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Paths that depend on the current location or on the environment.
pub struct RelativePaths;

impl Rule for RelativePaths {
    fn id(&self) -> &'static str {
        "relative_path"
    }

    fn apply(&self, original: &str, _corrected: &mut String) -> Vec<Issue> {
        RELATIVE_PATTERNS
            .iter()
            .filter(|(_, re)| re.is_match(original))
            .map(|(name, _)| {
                Issue::new(
                    self.id(),
                    IssueSeverity::Invalidating,
                    format!("Relative path pattern '{name}' detected - use absolute paths"),
                )
            })
            .collect()
    }
}

static CMDLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z][a-zA-Z]*)-([A-Z][a-zA-Z]+)\b").expect("valid regex")
});

/// `Verb-Noun` cmdlets whose verb is unknown. A verb has at least two
/// letters, so names like `X-Ray.txt` are not cmdlets.
pub struct VerbNoun;

impl Rule for VerbNoun {
    fn id(&self) -> &'static str {
        "verb_noun"
    }

    fn apply(&self, original: &str, _corrected: &mut String) -> Vec<Issue> {
        let mut seen: Vec<&str> = Vec::new();
        let mut issues = Vec::new();
        for caps in CMDLET.captures_iter(original) {
            let (Some(cmdlet), Some(verb)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if is_known_verb(verb.as_str()) || seen.contains(&cmdlet.as_str()) {
                continue;
            }
            seen.push(cmdlet.as_str());
            issues.push(Issue::new(
                self.id(),
                IssueSeverity::Invalidating,
                format!(
                    "Unrecognized PowerShell verb '{}' in cmdlet '{}'",
                    verb.as_str(),
                    cmdlet.as_str()
                ),
            ));
        }
        issues
    }
}

static ANY_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-[A-Za-z]").expect("valid regex"));
static FULL_NAME_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-[A-Z][a-zA-Z]+").expect("valid regex"));

/// Abbreviated parameters such as `-r` when no full parameter name is used.
pub struct ParameterNames;

impl Rule for ParameterNames {
    fn id(&self) -> &'static str {
        "parameter_names"
    }

    fn apply(&self, original: &str, _corrected: &mut String) -> Vec<Issue> {
        if ANY_FLAG.is_match(original) && !FULL_NAME_FLAG.is_match(original) {
            vec![Issue::new(
                self.id(),
                IssueSeverity::Warning,
                "PowerShell parameters should use full names (e.g., -Path, not -p)",
            )]
        } else {
            vec![]
        }
    }
}
