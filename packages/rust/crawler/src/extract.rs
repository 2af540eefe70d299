//! Readability-style main-text extraction.
//!
//! Picks the most likely content container, walks it while skipping page
//! chrome and comment sections, and flattens the rest to plain text with one
//! block element per line.

use scraper::{ElementRef, Html, Node, Selector};

/// Containers tried in order before falling back to `<body>`.
const CONTENT_SELECTORS: &[&str] = &["main", "article", r#"[role="main"]"#, ".content"];

/// Elements whose whole subtree is dropped.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg", "iframe",
    "table", "template", "button", "select",
];

/// Elements that start a new line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "ul",
];

/// Main text of an HTML document, or an empty string when nothing is extractable.
pub fn extract_main_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    for sel_str in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        for el in doc.select(&sel) {
            let text = element_text(el);
            if !text.is_empty() {
                return text;
            }
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next());
    match body {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    walk(el, &mut raw);
    collapse_whitespace(&raw)
}

fn walk(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED_TAGS.contains(&name) || is_comment_section(element) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                } else {
                    // Keep inline siblings from running together.
                    out.push(' ');
                }
                walk(child_el, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// User comment threads, identified by `id` or `class`.
fn is_comment_section(element: &scraper::node::Element) -> bool {
    ["id", "class"].iter().any(|attr| {
        element
            .attr(attr)
            .is_some_and(|value| value.to_ascii_lowercase().contains("comment"))
    })
}

fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
