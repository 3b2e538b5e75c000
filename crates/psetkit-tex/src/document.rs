//! Problem set structure: header metadata, sections and problems.

use std::sync::LazyLock;

use regex::Regex;

use crate::macros::extract_macros;
use crate::scan::{closing_brace, find_command_arg, find_environment, matching_end};

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\section\{|\\begin\{(problem\*?)\}").expect("marker pattern is valid")
});

static MAKETITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\maketitle\b").expect("maketitle pattern is valid"));

/// Header fields set in the preamble (`\course{}`, `\author{}`, `\hwtitle{}`)
/// and the raw body of the `inspiration` environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMeta {
    pub course: String,
    pub author: String,
    pub hwtitle: String,
    pub inspiration: String,
}

/// A top-level piece of the document body, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `\section{title}`.
    Section(String),
    /// `\begin{problem}` or `\begin{problem*}`, with its trimmed body.
    Problem { starred: bool, body: String },
}

/// A parsed problem set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub meta: DocMeta,
    /// Macro definitions lifted out of the source.
    pub macros: Vec<String>,
    pub blocks: Vec<Block>,
    pub set_number: u32,
}

impl Document {
    pub fn problem_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Problem { .. }))
            .count()
    }
}

/// Parse a fully expanded (comment-free, inputs inlined) source.
pub fn parse_document(tex: &str, set_number: u32) -> Document {
    let (macros, rest) = extract_macros(tex);

    let meta = DocMeta {
        course: braced_arg(&rest, "course").unwrap_or_default(),
        author: braced_arg(&rest, "author").unwrap_or_default(),
        hwtitle: braced_arg(&rest, "hwtitle").unwrap_or_default(),
        inspiration: environment_body(&rest, "inspiration").unwrap_or_default(),
    };

    let body = MAKETITLE_RE.replace_all(document_body(&rest), "");
    let blocks = parse_blocks(&body);
    tracing::debug!(
        macros = macros.len(),
        blocks = blocks.len(),
        "parsed problem set {set_number}"
    );

    Document {
        meta,
        macros,
        blocks,
        set_number,
    }
}

/// Trimmed argument of the first `\cmd{...}`.
pub fn braced_arg(tex: &str, cmd: &str) -> Option<String> {
    find_command_arg(tex, cmd, 0).map(|arg| tex[arg.body_start..arg.body_end].trim().to_string())
}

/// Trimmed body of the first complete `env` environment.
pub fn environment_body(tex: &str, env: &str) -> Option<String> {
    find_environment(tex, env, 0)
        .map(|block| tex[block.body_start..block.body_end].trim().to_string())
}

/// Text between `\begin{document}` and `\end{document}`, or all of `tex`
/// when the pair is missing or out of order.
pub fn document_body(tex: &str) -> &str {
    const BEGIN: &str = "\\begin{document}";
    let (Some(begin), Some(end)) = (tex.find(BEGIN), tex.find("\\end{document}")) else {
        return tex;
    };
    let start = begin + BEGIN.len();
    if end < start {
        return tex;
    }
    &tex[start..end]
}

/// Sections and problems of a document body. Anything between them is
/// ignored. Parsing stops at the first unterminated problem.
pub fn parse_blocks(body: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut i = 0;

    while let Some(caps) = MARKER_RE.captures_at(body, i) {
        let Some(whole) = caps.get(0) else { break };

        let Some(env) = caps.get(1) else {
            let Some(close) = closing_brace(body, whole.end()) else {
                tracing::warn!("unterminated \\section title");
                break;
            };
            blocks.push(Block::Section(body[whole.end()..close].trim().to_string()));
            i = close + 1;
            continue;
        };

        let env = env.as_str();
        let Some(end) = matching_end(body, whole.end(), env) else {
            tracing::warn!("unterminated {env} environment; ignoring the rest of the document");
            break;
        };
        blocks.push(Block::Problem {
            starred: env.ends_with('*'),
            body: body[whole.end()..end].trim().to_string(),
        });
        i = end + format!("\\end{{{env}}}").len();
    }

    blocks
}
