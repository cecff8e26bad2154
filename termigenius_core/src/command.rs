//! Splitting a command line into the commands it runs.
//!
//! Segments are separated by `|`, `||`, `&&` and `;` outside of quotes,
//! parentheses and script blocks. The backtick escapes the next character,
//! while `\` is kept literally since it is the Windows path separator.

fn flush_current(current: &mut String, out: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    current.clear();
}

fn try_parse_separator(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    match chars.peek().copied() {
        Some(';') => {
            chars.next();
            true
        }
        Some('|') => {
            chars.next();
            if matches!(chars.peek(), Some('|')) {
                chars.next();
            }
            true
        }
        Some('&') => {
            let mut lookahead = chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some('&')) {
                chars.next();
                chars.next();
                true
            } else {
                // a single `&` is the PowerShell call operator
                false
            }
        }
        _ => false,
    }
}

#[must_use]
pub fn split_command(command: &str) -> Vec<String> {
    let mut commands: Vec<String> = Vec::new();
    let mut current_command = String::new();
    let mut chars = command.chars().peekable();

    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut paren_depth: usize = 0;
    let mut brace_depth: usize = 0;

    while let Some(ch) = chars.peek().copied() {
        match ch {
            '`' if !in_single_quote => {
                current_command.push(ch);
                chars.next();
                if let Some(next_ch) = chars.peek().copied() {
                    current_command.push(next_ch);
                    chars.next();
                }
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                current_command.push(ch);
                chars.next();
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                current_command.push(ch);
                chars.next();
            }
            '(' if !in_single_quote && !in_double_quote => {
                paren_depth = paren_depth.saturating_add(1);
                current_command.push(ch);
                chars.next();
            }
            ')' if !in_single_quote && !in_double_quote && paren_depth > 0 => {
                paren_depth -= 1;
                current_command.push(ch);
                chars.next();
            }
            '{' if !in_single_quote && !in_double_quote => {
                brace_depth = brace_depth.saturating_add(1);
                current_command.push(ch);
                chars.next();
            }
            '}' if !in_single_quote && !in_double_quote && brace_depth > 0 => {
                brace_depth -= 1;
                current_command.push(ch);
                chars.next();
            }
            _ => {
                let can_split =
                    !in_single_quote && !in_double_quote && paren_depth == 0 && brace_depth == 0;
                if can_split && try_parse_separator(&mut chars) {
                    flush_current(&mut current_command, &mut commands);
                } else {
                    current_command.push(ch);
                    chars.next();
                }
            }
        }
    }

    flush_current(&mut current_command, &mut commands);
    commands
}

/// First whitespace-delimited token of a command segment, lowercased.
#[must_use]
pub fn base_command(segment: &str) -> Option<String> {
    segment
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}
