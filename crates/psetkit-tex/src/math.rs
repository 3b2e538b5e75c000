//! Math delimiter normalisation.
//!
//! MathJax is configured for `\( \)` and `\[ \]` only, so dollar delimiters
//! and bare display environments are rewritten into those forms.

use std::sync::LazyLock;

use regex::Regex;

use crate::scan::matching_end;

/// Display environments that MathJax only typesets inside `\[ \]`.
pub const MATH_BLOCK_ENVS: &[&str] = &[
    "equation", "equation*", "align", "align*", "gather", "gather*", "multline", "multline*",
    "flalign", "flalign*", "alignat", "alignat*",
];

static BEGIN_ENV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{([a-zA-Z]+\*?)\}").expect("begin pattern is valid"));

/// Rewrite `$$...$$` to `\[...\]` and `$...$` to `\(...\)`.
///
/// Escaped characters (including `\$`) are copied untouched. A single `$`
/// inside display math is left alone.
pub fn convert_dollar_math(tex: &str) -> String {
    let mut out = String::with_capacity(tex.len() + 16);
    let mut chars = tex.chars().peekable();
    let mut in_inline = false;
    let mut in_display = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                out.push_str(if in_display { "\\]" } else { "\\[" });
                in_display = !in_display;
            }
            '$' if !in_display => {
                out.push_str(if in_inline { "\\)" } else { "\\(" });
                in_inline = !in_inline;
            }
            _ => out.push(c),
        }
    }

    out
}

/// Wrap display math environments in `\[ ... \]`.
///
/// Environments inside a `\[` or `$$` span that is still open are left as
/// they are, as are unterminated ones.
pub fn wrap_math_environments(tex: &str) -> String {
    let mut out = String::with_capacity(tex.len() + 16);
    let mut last = 0;
    let mut search = 0;
    let mut display = DisplayState::default();

    while let Some(caps) = BEGIN_ENV_RE.captures_at(tex, search) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let env = name.as_str();
        search = whole.end();

        if !MATH_BLOCK_ENVS.contains(&env) {
            continue;
        }
        let Some(body_end) = matching_end(tex, whole.end(), env) else {
            continue;
        };
        let end = body_end + format!("\\end{{{env}}}").len();

        if !display.open_at(tex, whole.start()) {
            out.push_str(&tex[last..whole.start()]);
            out.push_str("\\[");
            out.push_str(&tex[whole.start()..end]);
            out.push_str("\\]");
            last = end;
        }
        search = end;
    }

    out.push_str(&tex[last..]);
    out
}

/// Whether a display span is open, tracked forward through the text.
#[derive(Debug, Default)]
struct DisplayState {
    scanned: usize,
    open: bool,
}

impl DisplayState {
    /// Advance to `pos` and report whether `\[` or `$$` is open there.
    ///
    /// Positions must not decrease between calls.
    fn open_at(&mut self, tex: &str, pos: usize) -> bool {
        let bytes = tex.as_bytes();
        let mut i = self.scanned;
        while i < pos {
            match bytes[i] {
                b'\\' => {
                    match bytes.get(i + 1) {
                        Some(b'[') => self.open = true,
                        Some(b']') => self.open = false,
                        _ => {}
                    }
                    i += 2;
                }
                b'$' if bytes.get(i + 1) == Some(&b'$') => {
                    self.open = !self.open;
                    i += 2;
                }
                _ => i += 1,
            }
        }
        self.scanned = i.max(self.scanned);
        self.open
    }
}

/// End (exclusive) of the `\(...\)` or `\[...\]` span opening at `start`.
///
/// Returns `None` if there is no opener at `start` or it is never closed.
pub fn math_span_end(tex: &str, start: usize) -> Option<usize> {
    let bytes = tex.as_bytes();
    if bytes.get(start) != Some(&b'\\') {
        return None;
    }
    let close = match bytes.get(start + 1)? {
        b'(' => b')',
        b'[' => b']',
        _ => return None,
    };

    let mut j = start + 2;
    while j < bytes.len() {
        if bytes[j] == b'\\' {
            if bytes.get(j + 1) == Some(&close) {
                return Some(j + 2);
            }
            j += 2;
        } else {
            j += 1;
        }
    }
    None
}
