//! Pulling the `<body>` out of a full page.

use std::sync::LazyLock;

use regex::Regex;

static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>").expect("body pattern is valid"));

static BODY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("body pattern is valid"));

/// The contents of the `<body>` element, and whether one was found.
///
/// Without a `<body>` tag the input is returned unchanged. A missing
/// closing tag takes everything after the opening one.
pub fn extract_body(html: &str) -> (&str, bool) {
    let Some(open) = BODY_OPEN_RE.find(html) else {
        return (html, false);
    };
    let end = BODY_CLOSE_RE
        .find_at(html, open.end())
        .map_or(html.len(), |close| close.start());
    (&html[open.end()..end], true)
}
