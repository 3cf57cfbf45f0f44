//! Unwrapping of search-engine redirect links.
//!
//! DuckDuckGo's HTML results point at `//duckduckgo.com/l/?uddg=<encoded>&rut=...`
//! rather than at the destination itself.

use std::sync::LazyLock;

use url::Url;

/// Query parameter carrying the real destination.
const DESTINATION_PARAM: &str = "uddg";

/// Base for resolving protocol-relative and path-only result links.
static ENGINE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://duckduckgo.com/").expect("engine base URL"));

/// Recover the destination URL from a redirect-wrapped result link.
///
/// Links without a non-empty `uddg` parameter, and links that do not parse
/// at all, come back unchanged.
pub fn resolve(wrapped_url: &str) -> String {
    let Ok(parsed) = ENGINE_BASE.join(wrapped_url) else {
        return wrapped_url.to_string();
    };

    parsed
        .query_pairs()
        .find(|(key, _)| key == DESTINATION_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| wrapped_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_protocol_relative_redirect() {
        let wrapped = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fdoc.rust-lang.org%2Fbook%2Fch04-01-what-is-ownership.html&rut=abc123";
        assert_eq!(
            resolve(wrapped),
            "https://doc.rust-lang.org/book/ch04-01-what-is-ownership.html"
        );
    }

    #[test]
    fn unwraps_absolute_redirect() {
        let wrapped = "https://duckduckgo.com/l/?kh=-1&uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1";
        assert_eq!(resolve(wrapped), "https://example.com/a?b=1");
    }

    #[test]
    fn passes_through_direct_links() {
        let direct = "https://example.com/page?x=1";
        assert_eq!(resolve(direct), direct);
    }

    #[test]
    fn blank_destination_passes_through() {
        let wrapped = "//duckduckgo.com/l/?uddg=&rut=abc";
        assert_eq!(resolve(wrapped), wrapped);
    }

    #[test]
    fn malformed_input_passes_through() {
        assert_eq!(resolve("http://[::1"), "http://[::1");
        assert_eq!(resolve(""), "");
    }
}
