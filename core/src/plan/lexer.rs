//! Line grammar for plan text.
//!
//! ```text
//! Thought: <text>
//! <digits>. <identifier>(<args>)[ trailing text, e.g. #comment]
//! ```
//!
//! Any other line (blank, `<END_OF_PLAN>`, prose) classifies as [`Line::Other`].

/// One classified plan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Thought(&'a str),
    Action(ActionLine<'a>),
    Other,
}

/// `<idx>. <name>(<args>)` with `args` as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionLine<'a> {
    pub idx: u32,
    pub name: &'a str,
    pub args: &'a str,
}

const THOUGHT_PREFIX: &str = "Thought:";

/// Classify a single line (without its line break). Thought wins over action.
pub fn classify_line(line: &str) -> Line<'_> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(THOUGHT_PREFIX) {
        return Line::Thought(rest.trim_start());
    }

    match parse_action(line) {
        Some(action) => Line::Action(action),
        None => Line::Other,
    }
}

fn parse_action(line: &str) -> Option<ActionLine<'_>> {
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .filter(|&end| end > 0)?;
    let idx: u32 = line[..digits_end].parse().ok()?;

    let rest = line[digits_end..].strip_prefix('.')?;
    let after_ws = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
    if after_ws.len() == rest.len() {
        return None;
    }

    let name_end = after_ws
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|&end| end > 0)?;
    let name = &after_ws[..name_end];

    let body = after_ws[name_end..].strip_prefix('(')?;
    let close = find_closing_paren(body).or_else(|| body.rfind(')'))?;

    Some(ActionLine {
        idx,
        name,
        args: &body[..close],
    })
}

/// Byte offset of the `)` closing an already-open `(`, skipping parentheses
/// inside quoted strings. `None` when the line never balances.
fn find_closing_paren(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
