//! Same-origin link expansion and the crawl frontier.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Collect up to `max_links` distinct same-origin links from raw HTML.
///
/// Hrefs are resolved against `base_url` and stripped of their fragment.
/// An unparseable `base_url` yields no links.
pub fn expand(base_url: &str, html: &str, max_links: usize) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    same_origin_links(&doc, &base, max_links)
}

/// Same as [`expand`] for an already-parsed document.
///
/// Scanning stops as soon as `max_links` links are collected.
pub fn same_origin_links(doc: &Html, base: &Url, max_links: usize) -> Vec<String> {
    let link_sel = Selector::parse("a[href]").expect("link selector");
    let origin = base.origin();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&link_sel) {
        if links.len() >= max_links {
            break;
        }

        let Some(href) = el.value().attr("href") else {
            continue;
        };

        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        resolved.set_fragment(None);

        if resolved.origin() != origin {
            continue;
        }

        let link = String::from(resolved);
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

// ---------------------------------------------------------------------------
// LinkFrontier
// ---------------------------------------------------------------------------

/// Deduplicated internal links gathered across all seed pages.
///
/// Iterates in discovery order, so truncation is deterministic.
#[derive(Debug, Clone, Default)]
pub struct LinkFrontier {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl LinkFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a URL; returns `false` if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    /// Insert every URL, returning how many were new.
    pub fn extend<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter().fold(0, |added, url| added + usize::from(self.insert(url)))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The first `limit` URLs in discovery order.
    pub fn take(&self, limit: usize) -> Vec<String> {
        self.order.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://docs.example.com/guide/intro";

    #[test]
    fn keeps_only_same_origin() {
        let html = r##"<html><body>
            <a href="/page2">Page 2</a>
            <a href="https://external.com/">External</a>
            <a href="relative/path">Relative</a>
            <a href="http://docs.example.com/insecure">Other scheme</a>
            <a href="https://docs.example.com:8443/port">Other port</a>
            <a href="mailto:team@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
        </body></html>"##;

        let links = expand(BASE, html, 20);
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/page2".to_string(),
                "https://docs.example.com/guide/relative/path".to_string(),
            ]
        );
    }

    #[test]
    fn deduplicates_and_strips_fragments() {
        let html = r##"<a href="/a">A</a><a href="/a#top">A again</a><a href="https://docs.example.com/a">A abs</a><a href="#section">Self</a>"##;
        let links = expand(BASE, html, 20);
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/a".to_string(),
                "https://docs.example.com/guide/intro".to_string(),
            ]
        );
    }

    #[test]
    fn caps_at_max_links() {
        let html: String = (0..50).map(|i| format!(r#"<a href="/p{i}">{i}</a>"#)).collect();
        let links = expand(BASE, &html, 20);
        assert_eq!(links.len(), 20);
        assert_eq!(links[19], "https://docs.example.com/p19");
    }

    #[test]
    fn output_is_unique_and_same_origin() {
        let html: String = (0..60)
            .map(|i| match i % 3 {
                0 => format!(r#"<a href="/p{}">x</a>"#, i % 7),
                1 => format!(r#"<a href="https://other{i}.com/">x</a>"#),
                _ => format!(r#"<a href="/p{}#frag{i}">x</a>"#, i % 5),
            })
            .collect();

        let links = expand(BASE, &html, 20);
        let unique: HashSet<_> = links.iter().collect();
        assert_eq!(unique.len(), links.len());
        assert!(links.iter().all(|l| l.starts_with("https://docs.example.com/")));
    }

    #[test]
    fn bad_base_yields_nothing() {
        assert!(expand("not a url", r#"<a href="/x">x</a>"#, 20).is_empty());
    }

    #[test]
    fn frontier_dedups_in_discovery_order() {
        let mut frontier = LinkFrontier::new();
        assert!(frontier.insert("https://a.com/1"));
        assert!(!frontier.insert("https://a.com/1"));

        let added = frontier.extend(["https://a.com/2", "https://a.com/1", "https://b.com/1"]);
        assert_eq!(added, 2);
        assert_eq!(frontier.len(), 3);
        assert!(frontier.contains("https://b.com/1"));
        assert_eq!(
            frontier.take(2),
            vec!["https://a.com/1".to_string(), "https://a.com/2".to_string()]
        );
    }

    #[test]
    fn frontier_take_caps() {
        let mut frontier = LinkFrontier::new();
        frontier.extend((0..150).map(|i| format!("https://a.com/{i}")));
        assert_eq!(frontier.take(100).len(), 100);
        assert_eq!(frontier.take(500).len(), 150);
    }
}
