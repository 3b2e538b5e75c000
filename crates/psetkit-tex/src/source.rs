//! Reading problem-set sources: comment stripping and `\input` inlining.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// `\input{name}` or `\input name`.
static INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\input(?:\s*\{([^}]*)\}|\s+([^\s%{}\\]+))").expect("input pattern is valid")
});

/// Remove TeX comments: everything from an unescaped `%` to the end of line.
pub fn strip_comments(tex: &str) -> String {
    tex.lines().map(strip_line).collect::<Vec<_>>().join("\n")
}

fn strip_line(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'%' && (i == 0 || bytes[i - 1] != b'\\') {
            return &line[..i];
        }
    }
    line
}

/// Read a source file, strip its comments and inline every `\input`.
pub fn load_source(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut chain: Vec<PathBuf> = path.canonicalize().into_iter().collect();
    Ok(resolve_with_chain(&strip_comments(&raw), base_dir, &mut chain))
}

/// Inline `\input` files found in `tex`, resolving names against `base_dir`.
///
/// Names without an extension get `.tex`. Inlined files are comment-stripped
/// and resolved recursively against their own directory. A file that would
/// include itself (directly or through other files) is replaced by a
/// `% (skipping recursive input: NAME)` marker; an unreadable one by
/// `% (missing input file: NAME)`.
pub fn resolve_inputs(tex: &str, base_dir: &Path) -> String {
    resolve_with_chain(tex, base_dir, &mut Vec::new())
}

fn resolve_with_chain(tex: &str, base_dir: &Path, chain: &mut Vec<PathBuf>) -> String {
    let mut out = String::with_capacity(tex.len());
    let mut last = 0;

    for caps in INPUT_RE.captures_iter(tex) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&tex[last..whole.start()]);
        last = whole.end();

        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        let file = with_tex_extension(name);
        let Ok(path) = base_dir.join(&file).canonicalize() else {
            tracing::warn!("missing input file: {}", base_dir.join(&file).display());
            out.push_str(&format!("\n% (missing input file: {file})\n"));
            continue;
        };
        if chain.contains(&path) {
            tracing::warn!("skipping recursive input: {}", path.display());
            out.push_str(&format!("\n% (skipping recursive input: {file})\n"));
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!("inlining {}", path.display());
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                chain.push(path);
                let inner = resolve_with_chain(&strip_comments(&content), &dir, chain);
                chain.pop();
                out.push('\n');
                out.push_str(&inner);
                out.push('\n');
            }
            Err(e) => {
                tracing::warn!("cannot read input file {}: {e}", path.display());
                out.push_str(&format!("\n% (missing input file: {file})\n"));
            }
        }
    }

    out.push_str(&tex[last..]);
    out
}

fn with_tex_extension(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.tex")
    }
}

/// Problem set number: the first run of digits in the file stem, or 1.
pub fn set_number_from_path(path: &Path) -> u32 {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return 1;
    };
    let Some(start) = stem.find(|c: char| c.is_ascii_digit()) else {
        return 1;
    };
    let digits: String = stem[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comments_keeps_escaped_percent() {
        let tex = "50\\% off % a comment\n% whole line\nkeep";
        assert_eq!(strip_comments(tex), "50\\% off \n\nkeep");
    }

    #[test]
    fn strip_comments_multibyte() {
        assert_eq!(strip_comments("π ≈ 3.14 % rough"), "π ≈ 3.14 ");
    }

    #[test]
    fn inline_braced_and_bare_inputs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("macros.tex"), "\\newcommand{\\R}{\\mathbb{R}} % reals").unwrap();
        std::fs::write(dir.path().join("preamble.sty"), "PRE").unwrap();

        let out = resolve_inputs("A\\input{macros}B\\input preamble.sty\nC", dir.path());
        assert_eq!(out, "A\n\\newcommand{\\R}{\\mathbb{R}} \nB\nPRE\n\nC");
    }

    #[test]
    fn nested_inputs_resolve_relative_to_their_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("parts")).unwrap();
        std::fs::write(dir.path().join("parts/outer.tex"), "outer \\input{inner}").unwrap();
        std::fs::write(dir.path().join("parts/inner.tex"), "inner").unwrap();

        let out = resolve_inputs("\\input{parts/outer}", dir.path());
        assert!(out.contains("outer"));
        assert!(out.contains("inner"));
        assert!(!out.contains("missing"));
    }

    #[test]
    fn missing_input_leaves_marker() {
        let dir = tempfile::tempdir().unwrap();
        let out = resolve_inputs("x \\input{nowhere} y", dir.path());
        assert!(out.contains("% (missing input file: nowhere.tex)"));
        assert!(out.starts_with("x "));
        assert!(out.ends_with(" y"));
    }

    #[test]
    fn recursive_input_terminates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.tex"), "A \\input{b}").unwrap();
        std::fs::write(dir.path().join("b.tex"), "B \\input{a}").unwrap();

        let out = resolve_inputs("\\input{a}", dir.path());
        assert!(out.contains('A'));
        assert!(out.contains('B'));
        assert!(out.contains("% (skipping recursive input: a.tex)"));
    }

    #[test]
    fn load_source_detects_self_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set01.tex");
        std::fs::write(&path, "top % comment\n\\input{set01}").unwrap();

        let out = load_source(&path).unwrap();
        assert!(out.starts_with("top \n"));
        assert!(out.contains("skipping recursive input: set01.tex"));
    }

    #[test]
    fn input_encoding_is_not_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let tex = "\\inputencoding{utf8}";
        assert_eq!(resolve_inputs(tex, dir.path()), tex);
    }

    #[test]
    fn set_number_from_file_name() {
        assert_eq!(set_number_from_path(Path::new("sets/set07.tex")), 7);
        assert_eq!(set_number_from_path(Path::new("hw12b3.tex")), 12);
        assert_eq!(set_number_from_path(Path::new("final.tex")), 1);
        assert_eq!(set_number_from_path(Path::new("99999999999999.tex")), 1);
    }
}
