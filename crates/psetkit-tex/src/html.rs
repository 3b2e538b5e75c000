//! Page rendering.
//!
//! Canvas strips `<style>` blocks, so every element carries its own inline
//! style.

use crate::document::{braced_arg, Block, Document};
use crate::inline::{html_escape, latex_to_html, wrap_paragraphs};

const PAGE_STYLE: &str = "max-width: 980px; margin: 0 auto; padding: 24px 18px; \
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; \
    color: #111; background: #fff;";
const HEADER_STYLE: &str = "padding: 18px 18px 14px 18px; margin: 0 0 18px 0; \
    border: 1px solid #e5e7eb; border-radius: 14px; box-shadow: 0 6px 20px rgba(0,0,0,0.06);";
const TITLE_STYLE: &str = "margin: 0; font-size: 24px; line-height: 1.2;";
const SUBTITLE_STYLE: &str = "margin: 6px 0 0 0; font-size: 14px; color: #444;";
const EPIGRAPH_STYLE: &str = "margin: 14px 0 0 0; padding-left: 14px; \
    border-left: 3px solid #e5e7eb; font-size: 14px; color: #333;";
const SECTION_STYLE: &str = "margin: 22px 0 12px 0; padding-top: 10px; font-size: 20px; line-height: 1.25;";
const CARD_STYLE: &str = "margin: 12px 0; padding: 14px 16px; border: 1px solid #e5e7eb; \
    border-radius: 14px; box-shadow: 0 6px 18px rgba(0,0,0,0.05); background: #fff;";
const CARD_TITLE_STYLE: &str = "margin: 0 0 10px 0; font-size: 14px; letter-spacing: 0.02em; \
    color: #374151; text-transform: uppercase;";

/// Page-level rendering choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// MathJax script to load in `<head>`; `None` leaves it out.
    pub mathjax_url: Option<String>,
}

/// Identifier shown on a problem card, e.g. `S03P12`.
pub fn problem_id(set_number: u32, problem: usize) -> String {
    format!("S{set_number:02}P{problem:02}")
}

/// Render a parsed problem set as a standalone HTML page.
pub fn render_document(doc: &Document, options: &RenderOptions) -> String {
    let meta = &doc.meta;
    let title = [&meta.hwtitle, &meta.course]
        .into_iter()
        .find(|s| !s.is_empty())
        .map_or("Problem Set", String::as_str);
    let title = html_escape(title);
    let set_label = format!("Set S{:02}", doc.set_number);
    let subtitle = [meta.course.as_str(), meta.author.as_str(), set_label.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut parts: Vec<String> = vec![
        "<!doctype html>".into(),
        "<html>".into(),
        "<head>".into(),
        "<meta charset=\"utf-8\"/>".into(),
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>".into(),
    ];
    if let Some(url) = &options.mathjax_url {
        parts.push(format!(
            "<script defer src=\"{}\"></script>",
            attr_escape(url)
        ));
    }
    parts.push(format!("<title>{title}</title>"));
    parts.push("</head>".into());
    parts.push("<body>".into());
    parts.push(format!("<div style=\"{PAGE_STYLE}\">"));
    if let Some(block) = macro_block(&doc.macros) {
        parts.push(block);
    }

    parts.push(format!("<div style=\"{HEADER_STYLE}\">"));
    parts.push(format!("<h1 style=\"{TITLE_STYLE}\">{title}</h1>"));
    parts.push(format!(
        "<div style=\"{SUBTITLE_STYLE}\">{}</div>",
        html_escape(&subtitle)
    ));
    let (quote, byline) = split_epigraph(&meta.inspiration);
    if !quote.is_empty() || !byline.is_empty() {
        parts.push(format!("<div style=\"{EPIGRAPH_STYLE}\">"));
        if !quote.is_empty() {
            parts.push(format!(
                "<div style=\"font-style: italic;\">{}</div>",
                latex_to_html(&quote)
            ));
        }
        if !byline.is_empty() {
            parts.push(format!(
                "<div style=\"margin-top: 8px;\">&mdash; {}</div>",
                latex_to_html(&byline)
            ));
        }
        parts.push("</div>".into());
    }
    parts.push("</div>".into());

    let mut problem = 0;
    for block in &doc.blocks {
        match block {
            Block::Section(heading) => {
                parts.push(format!(
                    "<h1 style=\"{SECTION_STYLE}\">{}</h1>",
                    latex_to_html(heading)
                ));
            }
            Block::Problem { starred, body } => {
                problem += 1;
                let star = if *starred { " ★" } else { "" };
                parts.push(format!("<div style=\"{CARD_STYLE}\">"));
                parts.push(format!(
                    "<div style=\"{CARD_TITLE_STYLE}\">{}{star}</div>",
                    problem_id(doc.set_number, problem)
                ));
                parts.push(wrap_paragraphs(&latex_to_html(body)));
                parts.push("</div>".into());
            }
        }
    }

    parts.push("</div>".into());
    parts.push("</body>".into());
    parts.push("</html>".into());
    parts.join("\n")
}

/// Escape a value for a double-quoted attribute.
fn attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

/// Hidden inline-math span that declares the macros to MathJax.
fn macro_block(macros: &[String]) -> Option<String> {
    let joined = macros
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return None;
    }
    Some(format!(
        "<span style=\"display:none;\">{}</span>",
        html_escape(&format!("\\({joined}\\)"))
    ))
}

/// Split an epigraph into its quote and the `\byline{}` argument.
fn split_epigraph(inspiration: &str) -> (String, String) {
    let inspiration = inspiration.trim();
    match inspiration.find("\\byline{") {
        Some(at) => (
            inspiration[..at].trim().to_string(),
            braced_arg(&inspiration[at..], "byline").unwrap_or_default(),
        ),
        None => (inspiration.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocMeta;

    fn make_document() -> Document {
        Document {
            meta: DocMeta {
                course: "Math 101".into(),
                author: "A. Teacher".into(),
                hwtitle: "Limits & Series".into(),
                inspiration: "Keep going. \\byline{\\emph{Anon}}".into(),
            },
            macros: vec!["\\newcommand{\\R}{\\mathbb{R}}".into()],
            blocks: vec![
                Block::Section("Warm-up".into()),
                Block::Problem {
                    starred: false,
                    body: "Let $x<1$.\n\nShow it.".into(),
                },
                Block::Problem {
                    starred: true,
                    body: "Harder.".into(),
                },
            ],
            set_number: 4,
        }
    }

    #[test]
    fn page_contains_required_elements() {
        let html = render_document(&make_document(), &RenderOptions::default());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("<title>Limits &amp; Series</title>"));
        assert!(html.contains(">Math 101 A. Teacher Set S04</div>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<style>"));
    }

    #[test]
    fn problem_cards_are_numbered() {
        let html = render_document(&make_document(), &RenderOptions::default());
        assert!(html.contains(">S04P01</div>"));
        assert!(html.contains(">S04P02 ★</div>"));
        assert!(html.contains(">Warm-up</h1>"));
        assert!(html.contains("\\(x&lt;1\\)"));
        assert_eq!(html.matches("<p style=").count(), 3);
    }

    #[test]
    fn macros_are_hidden() {
        let html = render_document(&make_document(), &RenderOptions::default());
        assert!(html.contains(
            "<span style=\"display:none;\">\\(\\newcommand{\\R}{\\mathbb{R}}\\)</span>"
        ));

        let mut doc = make_document();
        doc.macros.clear();
        let html = render_document(&doc, &RenderOptions::default());
        assert!(!html.contains("display:none"));
    }

    #[test]
    fn epigraph_with_byline() {
        let html = render_document(&make_document(), &RenderOptions::default());
        assert!(html.contains("<div style=\"font-style: italic;\">Keep going.</div>"));
        assert!(html.contains("&mdash; <em>Anon</em></div>"));
    }

    #[test]
    fn mathjax_script_is_optional() {
        let options = RenderOptions {
            mathjax_url: Some("https://cdn.example/mathjax.js".into()),
        };
        let html = render_document(&make_document(), &options);
        assert!(html.contains("<script defer src=\"https://cdn.example/mathjax.js\"></script>"));
    }

    #[test]
    fn mathjax_url_is_attribute_escaped() {
        let options = RenderOptions {
            mathjax_url: Some("https://cdn.example/m.js?a=1&b=\"><x".into()),
        };
        let html = render_document(&make_document(), &options);
        assert!(html.contains(
            "<script defer src=\"https://cdn.example/m.js?a=1&amp;b=&quot;&gt;&lt;x\"></script>"
        ));
        assert!(!html.contains("<x"));
    }

    #[test]
    fn title_fallbacks() {
        let mut doc = make_document();
        doc.meta.hwtitle.clear();
        assert!(render_document(&doc, &RenderOptions::default())
            .contains("<title>Math 101</title>"));

        doc.meta = DocMeta::default();
        let html = render_document(&doc, &RenderOptions::default());
        assert!(html.contains("<title>Problem Set</title>"));
        assert!(html.contains(">Set S04</div>"));
        assert!(!html.contains("&mdash;"));
    }

    #[test]
    fn wide_set_numbers() {
        assert_eq!(problem_id(3, 12), "S03P12");
        assert_eq!(problem_id(123, 7), "S123P07");
    }
}
