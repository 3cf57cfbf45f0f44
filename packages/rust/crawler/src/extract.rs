//! Paragraph text extraction.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Runs of whitespace inside a paragraph, collapsed to one space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Extract up to `max_paragraphs` `<p>` blocks from raw HTML, joined by newlines.
///
/// Never fails; a document without paragraphs yields `""`.
pub fn extract(html: &str, max_paragraphs: usize) -> String {
    let doc = Html::parse_document(html);
    paragraph_text(&doc, max_paragraphs)
}

/// Same as [`extract`] for an already-parsed document.
pub fn paragraph_text(doc: &Html, max_paragraphs: usize) -> String {
    let p_sel = Selector::parse("p").expect("paragraph selector");

    doc.select(&p_sel)
        .take(max_paragraphs)
        .map(|el| {
            let raw = el.text().collect::<String>();
            WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paragraphs_in_order() {
        let html = "<html><body><p>One.</p><div><p>Two.</p></div><p>Three.</p></body></html>";
        assert_eq!(extract(html, 10), "One.\nTwo.\nThree.");
    }

    #[test]
    fn caps_paragraph_count() {
        let html: String = (0..15).map(|i| format!("<p>para {i}</p>")).collect();
        let text = extract(&html, 10);
        assert_eq!(text.lines().count(), 10);
        assert!(text.ends_with("para 9"));
        assert!(!text.contains("para 10"));
    }

    #[test]
    fn collapses_inline_markup_and_whitespace() {
        let html = "<p>\n  Ownership <em>rules</em>\n   in   <a href=\"/x\">Rust</a>.\n</p>";
        assert_eq!(extract(html, 10), "Ownership rules in Rust.");
    }

    #[test]
    fn no_paragraphs_is_empty() {
        assert_eq!(extract("<html><body><div>text</div></body></html>", 10), "");
        assert_eq!(extract("", 10), "");
    }

    #[test]
    fn malformed_html_degrades() {
        let html = "<p>unclosed <b>bold<p>second";
        let text = extract(html, 10);
        assert!(text.contains("unclosed bold"));
        assert!(text.contains("second"));
    }
}
