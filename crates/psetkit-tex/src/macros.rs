//! Macro definition extraction.
//!
//! Definitions are lifted out of the document so MathJax can be told about
//! them once, in a hidden block, instead of seeing them as page text.

use std::sync::LazyLock;

use regex::Regex;

use crate::scan::closing_brace;

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:re)?newcommand\b|\\providecommand\b|\\DeclareMathOperator\b|\\def\b")
        .expect("definition pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    NewCommand,
    MathOperator,
    Def,
}

/// Split `tex` into its macro definitions and the remaining text.
///
/// Definitions are returned trimmed and in source order.
pub fn extract_macros(tex: &str) -> (Vec<String>, String) {
    let mut macros = Vec::new();
    let mut rest = String::with_capacity(tex.len());
    let mut i = 0;

    while let Some(m) = DEFINITION_RE.find_at(tex, i) {
        rest.push_str(&tex[i..m.start()]);
        let kind = match m.as_str() {
            "\\DeclareMathOperator" => Kind::MathOperator,
            "\\def" => Kind::Def,
            _ => Kind::NewCommand,
        };
        let end = definition_end(tex, m.end(), kind);
        let block = tex[m.start()..end].trim();
        if !block.is_empty() {
            macros.push(block.to_string());
        }
        i = end;
    }
    rest.push_str(&tex[i..]);

    (macros, rest)
}

/// End of a definition whose command keyword ends at `i`.
fn definition_end(tex: &str, mut i: usize, kind: Kind) -> usize {
    let bytes = tex.as_bytes();

    i = skip_whitespace(tex, i);
    if kind != Kind::Def && bytes.get(i) == Some(&b'*') {
        i = skip_whitespace(tex, i + 1);
    }

    // Macro name: `{\name}` or `\name`
    i = match bytes.get(i) {
        Some(b'{') => match closing_brace(tex, i + 1) {
            Some(close) => close + 1,
            None => return tex.len(),
        },
        Some(b'\\') => control_sequence_end(tex, i),
        _ => return line_end(tex, i),
    };

    match kind {
        Kind::NewCommand => {
            // [argument count] and [default for the optional argument]
            for _ in 0..2 {
                let j = skip_whitespace(tex, i);
                if bytes.get(j) != Some(&b'[') {
                    break;
                }
                match tex[j..].find(']') {
                    Some(k) => i = j + k + 1,
                    None => return line_end(tex, j),
                }
            }
        }
        Kind::Def => {
            // Parameter text (`#1#2`) runs up to the body's opening brace.
            match tex[i..].find(['{', '\n']) {
                Some(k) if bytes[i + k] == b'{' => i += k,
                _ => return line_end(tex, i),
            }
        }
        Kind::MathOperator => {}
    }

    i = skip_whitespace(tex, i);
    match bytes.get(i) {
        Some(b'{') => closing_brace(tex, i + 1).map_or(tex.len(), |close| close + 1),
        _ => line_end(tex, i),
    }
}

fn skip_whitespace(tex: &str, i: usize) -> usize {
    tex.get(i..)
        .and_then(|rest| rest.find(|c: char| !c.is_whitespace()))
        .map_or(tex.len(), |k| i + k)
}

/// End of the control sequence starting with the backslash at `i`.
fn control_sequence_end(tex: &str, i: usize) -> usize {
    let rest = &tex[i + 1..];
    let letters = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if letters > 0 {
        return i + 1 + letters;
    }
    // Control symbol: exactly one character.
    rest.chars()
        .next()
        .map_or(tex.len(), |c| i + 1 + c.len_utf8())
}

fn line_end(tex: &str, i: usize) -> usize {
    tex.get(i..)
        .and_then(|rest| rest.find('\n'))
        .map_or(tex.len(), |k| i + k)
}
