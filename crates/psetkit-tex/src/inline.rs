//! Inline LaTeX to HTML: lists, formatting commands and line breaks.
//!
//! Math is never touched beyond HTML escaping; MathJax typesets it in the
//! browser. Plain text is escaped before any tag is emitted.

use std::sync::LazyLock;

use regex::Regex;

use crate::math::{convert_dollar_math, math_span_end, wrap_math_environments};
use crate::scan::{closing_brace, find_environment};

const LIST_STYLE: &str = "margin: 0.6em 0 0.6em 1.2em; padding-left: 1.2em;";
const ITEM_STYLE: &str = "margin: 0.35em 0;";
const PARAGRAPH_STYLE: &str = "margin: 0.6em 0; line-height: 1.45;";

/// Formatting commands and the tags they become.
const FORMATTING: &[(&str, &str, &str)] = &[
    ("\\emph{", "<em>", "</em>"),
    ("\\textit{", "<em>", "</em>"),
    ("\\textbf{", "<strong>", "</strong>"),
];

static LIST_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(enumerate|itemize)\}").expect("list pattern is valid")
});

static LIST_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(?:enumerate|itemize)\}|\\end\{(?:enumerate|itemize)\}|\\item\b")
        .expect("list token pattern is valid")
});

static TRAILING_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("whitespace pattern is valid"));

static LEADING_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]+").expect("whitespace pattern is valid"));

static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

static NEWLINE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("newline pattern is valid"));

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(?:ol|ul|div|h1|h2|h3|blockquote)\b").expect("block tag pattern is valid")
});

/// Escape `&`, `<` and `>`. Quotes are left alone.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Convert a LaTeX fragment to HTML.
///
/// `enumerate` and `itemize` become `<ol>` and `<ul>` (nested lists are
/// converted inside their item). Lists are surrounded by blank lines so
/// [`wrap_paragraphs`] keeps them out of paragraphs.
pub fn latex_to_html(tex: &str) -> String {
    let mut out = String::with_capacity(tex.len() + tex.len() / 4);
    let mut i = 0;

    while let Some(caps) = LIST_BEGIN_RE.captures_at(tex, i) {
        let (Some(whole), Some(env)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        // An unterminated list is left to the text pass.
        let Some(block) = find_environment(tex, env.as_str(), whole.start()) else {
            break;
        };
        out.push_str(&render_text(&tex[i..block.start]));
        out.push_str(&render_list(
            env.as_str(),
            &tex[block.body_start..block.body_end],
        ));
        i = block.end;
    }

    out.push_str(&render_text(&tex[i..]));
    out
}

fn render_list(env: &str, body: &str) -> String {
    let tag = if env == "enumerate" { "ol" } else { "ul" };
    let items: String = split_items(body)
        .into_iter()
        .map(|item| format!("<li style=\"{ITEM_STYLE}\">{}</li>", render_item(item)))
        .collect();
    format!("\n\n<{tag} style=\"{LIST_STYLE}\">{items}</{tag}>\n\n")
}

/// Render one item, with an optional `[label]` shown in bold.
fn render_item(item: &str) -> String {
    let html = match item.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        Some((label, rest)) => format!(
            "<strong>{}</strong> {}",
            latex_to_html(label.trim()),
            latex_to_html(rest.trim())
        ),
        None => latex_to_html(item),
    };
    // Blank lines inside an item would split the enclosing paragraph pass.
    PARAGRAPH_BREAK_RE
        .replace_all(html.trim(), "\n")
        .into_owned()
}

/// Top-level `\item` chunks of a list body; items of nested lists stay
/// inside their parent's chunk. Text before the first `\item` is dropped.
fn split_items(body: &str) -> Vec<&str> {
    let mut markers = Vec::new();
    let mut depth = 0usize;
    for m in LIST_TOKEN_RE.find_iter(body) {
        let token = m.as_str();
        if token.starts_with("\\begin") {
            depth += 1;
        } else if token.starts_with("\\end") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            markers.push((m.start(), m.end()));
        }
    }

    if markers.is_empty() {
        let whole = body.trim();
        return if whole.is_empty() { Vec::new() } else { vec![whole] };
    }

    markers
        .iter()
        .enumerate()
        .map(|(k, &(_, content_start))| {
            let end = markers.get(k + 1).map_or(body.len(), |&(next, _)| next);
            body[content_start..end].trim()
        })
        .collect()
}

/// Convert text containing no list environments.
fn render_text(tex: &str) -> String {
    let tex = convert_dollar_math(&wrap_math_environments(tex));
    let bytes = tex.as_bytes();
    let mut out = String::with_capacity(tex.len());
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }

        if let Some(end) = math_span_end(&tex, i) {
            push_plain(&mut out, &tex[text_start..i]);
            out.push_str(&html_escape(&tex[i..end]));
            i = end;
            text_start = i;
            continue;
        }

        if let Some(&(cmd, open, close)) = FORMATTING
            .iter()
            .find(|(cmd, _, _)| tex[i..].starts_with(cmd))
        {
            push_plain(&mut out, &tex[text_start..i]);
            let body_start = i + cmd.len();
            let (body_end, end) = match closing_brace(&tex, body_start) {
                Some(close) => (close, close + 1),
                None => (tex.len(), tex.len()),
            };
            out.push_str(open);
            out.push_str(&latex_to_html(&tex[body_start..body_end]));
            out.push_str(close);
            i = end;
            text_start = i;
            continue;
        }

        if bytes.get(i + 1) == Some(&b'\\') {
            push_plain(&mut out, &tex[text_start..i]);
            out.push_str("<br/>");
            i += 2;
            // Optional spacing argument, as in `\\[2pt]`.
            if tex[i..].starts_with('[') {
                let close = tex[i..].find(']');
                if let Some(close) = close.filter(|&c| !tex[i..i + c].contains('\n')) {
                    i += close + 1;
                }
            }
            text_start = i;
            continue;
        }

        // Any other control sequence stays as text.
        i += 2;
    }

    push_plain(&mut out, &tex[text_start..]);
    out
}

fn push_plain(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    let text = TRAILING_WS_RE.replace_all(text, "\n");
    let text = LEADING_WS_RE.replace_all(&text, "\n");
    out.push_str(&html_escape(&text));
}

/// Wrap text chunks separated by blank lines in `<p>`.
///
/// Chunks that already start with a block tag are kept as they are; the
/// newlines inside a paragraph collapse to single spaces.
pub fn wrap_paragraphs(html: &str) -> String {
    PARAGRAPH_BREAK_RE
        .split(html.trim())
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if BLOCK_TAG_RE.is_match(chunk) {
                chunk.to_string()
            } else {
                format!(
                    "<p style=\"{PARAGRAPH_STYLE}\">{}</p>",
                    NEWLINE_RUN_RE.replace_all(chunk, " ")
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_leaves_quotes() {
        assert_eq!(html_escape("a<b & \"c\">"), "a&lt;b &amp; \"c\"&gt;");
    }

    #[test]
    fn formatting_commands() {
        assert_eq!(
            latex_to_html("\\emph{a} \\textbf{b \\textit{c}}"),
            "<em>a</em> <strong>b <em>c</em></strong>"
        );
    }

    #[test]
    fn text_is_escaped_but_tags_are_not() {
        assert_eq!(
            latex_to_html("x < y & \\textbf{z > 0}"),
            "x &lt; y &amp; <strong>z &gt; 0</strong>"
        );
    }

    #[test]
    fn math_is_kept_and_escaped() {
        assert_eq!(latex_to_html("if $a<b$ then"), "if \\(a&lt;b\\) then");
        assert_eq!(latex_to_html("\\emph{$x$}"), "<em>\\(x\\)</em>");
    }

    #[test]
    fn display_environment_after_dollar_display() {
        let html = latex_to_html("$$a=b$$\n\\begin{align}c&=d \\\\ e&=f\\end{align}");
        assert_eq!(
            html,
            "\\[a=b\\]\n\\[\\begin{align}c&amp;=d \\\\ e&amp;=f\\end{align}\\]"
        );
        assert!(!html.contains("<br/>"));
    }

    #[test]
    fn formatting_inside_math_is_left_alone() {
        assert_eq!(
            latex_to_html("\\(\\textbf{v}\\)"),
            "\\(\\textbf{v}\\)"
        );
    }

    #[test]
    fn line_breaks() {
        assert_eq!(latex_to_html("a\\\\b"), "a<br/>b");
        // A line break with a spacing argument is not display math.
        assert_eq!(latex_to_html("a\\\\[2pt]b"), "a<br/>b");
        assert_eq!(latex_to_html("a\\\\[b\nc]"), "a<br/>[b\nc]");
    }

    #[test]
    fn unclosed_math_is_text() {
        assert_eq!(latex_to_html("\\(open"), "\\(open");
    }

    #[test]
    fn whitespace_around_newlines_is_trimmed() {
        assert_eq!(latex_to_html("one  \n   two"), "one\ntwo");
    }

    #[test]
    fn simple_enumerate() {
        let html = latex_to_html("\\begin{enumerate}\\item One \\item Two\\end{enumerate}");
        assert_eq!(
            html.trim(),
            format!(
                "<ol style=\"{LIST_STYLE}\"><li style=\"{ITEM_STYLE}\">One</li>\
                 <li style=\"{ITEM_STYLE}\">Two</li></ol>"
            )
        );
    }

    #[test]
    fn nested_lists() {
        let tex = "\\begin{itemize}\\item a\\begin{enumerate}\\item b\\item c\\end{enumerate}\\item d\\end{itemize}";
        let html = latex_to_html(tex);
        assert_eq!(html.matches("<li").count(), 4);
        assert_eq!(html.matches("<ul").count(), 1);
        assert_eq!(html.matches("<ol").count(), 1);
        assert!(html.trim_end().ends_with("</li></ul>"));
        assert!(!html.contains("\\item"));
    }

    #[test]
    fn item_labels() {
        let html = latex_to_html("\\begin{itemize}\\item[(a)] first\\end{itemize}");
        assert!(html.contains("<strong>(a)</strong> first"));
    }

    #[test]
    fn list_without_items() {
        let html = latex_to_html("\\begin{itemize} lone text \\end{itemize}");
        assert!(html.contains(">lone text</li>"));
        let empty = latex_to_html("\\begin{itemize}  \\end{itemize}");
        assert!(!empty.contains("<li"));
    }

    #[test]
    fn unterminated_list_stays_text() {
        let html = latex_to_html("\\begin{enumerate}\\item x");
        assert!(!html.contains("<ol"));
        assert!(html.contains("\\item x"));
    }

    #[test]
    fn paragraphs_and_blocks() {
        let html = wrap_paragraphs("first\nline\n\n<ol><li>x</li></ol>\n\n  \n\nsecond");
        assert_eq!(
            html,
            format!(
                "<p style=\"{PARAGRAPH_STYLE}\">first line</p>\n<ol><li>x</li></ol>\n\
                 <p style=\"{PARAGRAPH_STYLE}\">second</p>"
            )
        );
    }

    #[test]
    fn list_after_text_is_its_own_block() {
        let html = wrap_paragraphs(&latex_to_html(
            "Prove:\n\\begin{enumerate}\\item this\\end{enumerate}\nDone.",
        ));
        let blocks: Vec<&str> = html.lines().collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("<p "));
        assert!(blocks[1].starts_with("<ol "));
        assert!(blocks[2].contains("Done."));
    }
}
