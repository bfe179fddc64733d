//! Pulling a symbol name out of a free-text answer.
//!
//! Opponents answer in prose ("... so the Final answer: Anchor."). Patterns
//! are tried in order and a candidate only counts if it is one of the
//! allowed names:
//!
//! 1. `Final answer: X` / `Answer: X`
//! 2. `The shared symbol is X` at the start of a line
//! 3. the first line with no full stop in it
//!
//! Failing those, the last non-empty line, then any line that is exactly a
//! name (scanning upwards).

use regex::Regex;
use std::sync::OnceLock;

const PATTERNS: [&str; 3] = [
    r"(?im)(?:final answer|answer):\s*([^\n.]+)",
    r"(?im)^(?:the )?shared symbol is[:\s]+([^\n.]+)",
    r"(?im)^([^\n.]+)\s*$",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::error!(pattern = p, %err, "answer pattern does not compile");
                    None
                }
            })
            .collect()
    })
}

/// The allowed name `candidate` spells, ignoring case and decoration.
fn lookup<'a, S: AsRef<str>>(candidate: &str, names: &'a [S]) -> Option<&'a str> {
    let candidate = candidate.trim().trim_matches(|c: char| matches!(c, '*' | '"' | '\'' | '`' | '_'));
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    names
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|name| name.trim().eq_ignore_ascii_case(candidate))
}

/// Extract the single symbol name `text` settles on, spelled as in `names`.
pub fn extract_symbol_name<S: AsRef<str>>(text: &str, names: &[S]) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for re in patterns() {
        if let Some(found) = re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| lookup(m.as_str(), names))
        {
            return Some(found.to_string());
        }
    }

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find_map(|line| lookup(line, names))
        .map(str::to_string)
}
