//! Brace and environment matching shared by the converter passes.
//!
//! All scanning is byte-wise. Every position returned sits on an ASCII byte
//! (`{`, `}` or `\`), so slicing at it never splits a UTF-8 character.

/// Index of the `}` closing a group whose body starts at `start`.
///
/// Escaped characters (`\{`, `\}`, `\\`) are skipped. Returns `None` when the
/// group is never closed.
pub(crate) fn closing_brace(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// A `\cmd{...}` occurrence located in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CommandArg {
    /// Position of the leading backslash.
    pub start: usize,
    /// First byte of the argument body.
    pub body_start: usize,
    /// One past the last byte of the argument body.
    pub body_end: usize,
    /// First byte after the closing brace (or end of input when unclosed).
    pub end: usize,
}

/// Find the first `\cmd{...}` at or after `from`.
///
/// An unclosed argument runs to the end of the input.
pub(crate) fn find_command_arg(s: &str, cmd: &str, from: usize) -> Option<CommandArg> {
    let needle = format!("\\{cmd}{{");
    let start = s.get(from..)?.find(&needle)? + from;
    let body_start = start + needle.len();
    Some(match closing_brace(s, body_start) {
        Some(close) => CommandArg {
            start,
            body_start,
            body_end: close,
            end: close + 1,
        },
        None => CommandArg {
            start,
            body_start,
            body_end: s.len(),
            end: s.len(),
        },
    })
}

/// Start of the `\end{env}` matching an environment whose body begins at
/// `body_start`. Nested environments of the same name are counted.
pub(crate) fn matching_end(tex: &str, body_start: usize, env: &str) -> Option<usize> {
    let begin = format!("\\begin{{{env}}}");
    let end = format!("\\end{{{env}}}");
    let mut depth = 1usize;
    let mut i = body_start;
    loop {
        let next_end = tex.get(i..)?.find(&end)? + i;
        match tex[i..].find(&begin).map(|p| p + i) {
            Some(next_begin) if next_begin < next_end => {
                depth += 1;
                i = next_begin + begin.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_end);
                }
                i = next_end + end.len();
            }
        }
    }
}

/// A complete `\begin{env} ... \end{env}` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EnvBlock {
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub end: usize,
}

/// Find the first complete `env` block at or after `from`.
pub(crate) fn find_environment(tex: &str, env: &str, from: usize) -> Option<EnvBlock> {
    let begin = format!("\\begin{{{env}}}");
    let start = tex.get(from..)?.find(&begin)? + from;
    let body_start = start + begin.len();
    let body_end = matching_end(tex, body_start, env)?;
    Some(EnvBlock {
        start,
        body_start,
        body_end,
        end: body_end + format!("\\end{{{env}}}").len(),
    })
}
