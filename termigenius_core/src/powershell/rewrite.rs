use std::sync::LazyLock;

use regex::Regex;

use super::tables::lookup_alias;

/// A word is a maximal run of letters, digits, `_` and `-`, so cmdlet names
/// and parameters are single words.
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w-]+").expect("valid regex"));

/// Characters that make a word part of a variable, path or drive reference.
const NOT_AFTER: &[char] = &['$', '\\', '/', '.', ':', '@', '%'];
const NOT_BEFORE: &[char] = &['\\', '/', '.', ':', '%'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Distinct `(alias, canonical)` pairs in order of first occurrence.
    pub substitutions: Vec<(&'static str, &'static str)>,
}

/// Replace every standalone alias word in `command` with its canonical form.
///
/// Words inside paths and variables (`C:\Temp\ls`, `$ls`) are left as they
/// are, unlike a plain `\b` word-boundary match.
#[must_use]
pub fn rewrite_aliases(command: &str) -> Rewrite {
    let mut text = String::with_capacity(command.len());
    let mut substitutions: Vec<(&'static str, &'static str)> = Vec::new();
    let mut last = 0;

    for word in WORD.find_iter(command) {
        let Some((alias, canonical)) = lookup_alias(word.as_str()) else {
            continue;
        };
        if !is_standalone(command, word.start(), word.end()) {
            continue;
        }

        text.push_str(&command[last..word.start()]);
        text.push_str(canonical);
        last = word.end();

        if !substitutions.iter().any(|(a, _)| *a == alias) {
            tracing::debug!(alias, canonical, "alias substituted");
            substitutions.push((alias, canonical));
        }
    }
    text.push_str(&command[last..]);

    Rewrite {
        text,
        substitutions,
    }
}

fn is_standalone(command: &str, start: usize, end: usize) -> bool {
    let before = command[..start].chars().next_back();
    let after = command[end..].chars().next();
    !before.is_some_and(|c| NOT_AFTER.contains(&c))
        && !after.is_some_and(|c| NOT_BEFORE.contains(&c))
}
