//! Search queries, cache keys and upstream page URLs

use crate::{ProxyError, Result};
use std::fmt;
use url::Url;

/// Namespace prefix shared by every cache key
pub const CACHE_NAMESPACE: &str = "search";

/// A trimmed, non-empty search query
///
/// Construct with [`SearchQuery::parse`]; the inner string never has leading
/// or trailing whitespace and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Parses the raw `query` parameter of an inbound request
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::MissingQuery`] when the parameter is absent or
    /// blank after trimming.
    ///
    /// # Examples
    ///
    /// ```
    /// use wikiproxy_core::SearchQuery;
    ///
    /// let query = SearchQuery::parse(Some("  OpenAI ")).unwrap();
    /// assert_eq!(query.as_str(), "OpenAI");
    /// assert!(SearchQuery::parse(Some("   ")).is_err());
    /// assert!(SearchQuery::parse(None).is_err());
    /// ```
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            Some(trimmed) if !trimmed.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(ProxyError::MissingQuery),
        }
    }

    /// The trimmed query text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key for this query, `search:<query>`
    ///
    /// # Examples
    ///
    /// ```
    /// use wikiproxy_core::SearchQuery;
    ///
    /// let query = SearchQuery::parse(Some("OpenAI")).unwrap();
    /// assert_eq!(query.cache_key(), "search:OpenAI");
    /// ```
    pub fn cache_key(&self) -> String {
        format!("{}:{}", CACHE_NAMESPACE, self.0)
    }

    /// Builds the MediaWiki parse URL for this query against `endpoint`
    ///
    /// Any query string already present on `endpoint` is replaced. The page
    /// title is form-urlencoded, so `C++` addresses the `C++` page rather than
    /// `C  `.
    pub fn page_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("action", "parse")
            .append_pair("format", "json")
            .append_pair("section", "0")
            .append_pair("page", &self.0);
        url
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse("https://en.wikipedia.org/w/api.php").unwrap()
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let query = SearchQuery::parse(Some("  OpenAI ")).unwrap();
        assert_eq!(query.as_str(), "OpenAI");
        assert_eq!(query.to_string(), "OpenAI");
    }

    #[test]
    fn test_parse_rejects_missing_and_blank() {
        assert!(matches!(
            SearchQuery::parse(None),
            Err(ProxyError::MissingQuery)
        ));
        assert!(matches!(
            SearchQuery::parse(Some("")),
            Err(ProxyError::MissingQuery)
        ));
        assert!(matches!(
            SearchQuery::parse(Some(" \t\n ")),
            Err(ProxyError::MissingQuery)
        ));
    }

    #[test]
    fn test_parse_keeps_case_and_inner_spaces() {
        let query = SearchQuery::parse(Some(" Rust (programming language) ")).unwrap();
        assert_eq!(query.as_str(), "Rust (programming language)");
    }

    #[test]
    fn test_cache_key_is_stable() {
        let first = SearchQuery::parse(Some("OpenAI")).unwrap();
        let second = SearchQuery::parse(Some("   OpenAI")).unwrap();
        assert_eq!(first.cache_key(), "search:OpenAI");
        assert_eq!(first.cache_key(), second.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_queries() {
        let queries = ["OpenAI", "openai", "Open AI", "OpenAI2", "search:OpenAI"];
        let keys: std::collections::HashSet<String> = queries
            .iter()
            .map(|q| SearchQuery::parse(Some(q)).unwrap().cache_key())
            .collect();
        assert_eq!(keys.len(), queries.len());
    }

    #[test]
    fn test_page_url_for_simple_title() {
        let query = SearchQuery::parse(Some("  OpenAI ")).unwrap();
        assert_eq!(
            query.page_url(&endpoint()).as_str(),
            "https://en.wikipedia.org/w/api.php?action=parse&format=json&section=0&page=OpenAI"
        );
    }

    #[test]
    fn test_page_url_encodes_reserved_characters() {
        let query = SearchQuery::parse(Some("C++ & Rust")).unwrap();
        let url = query.page_url(&endpoint());
        assert!(url.as_str().ends_with("&page=C%2B%2B+%26+Rust"));

        let page = url
            .query_pairs()
            .find(|(name, _)| name == "page")
            .map(|(_, value)| value.into_owned());
        assert_eq!(page.as_deref(), Some("C++ & Rust"));
    }

    #[test]
    fn test_page_url_replaces_existing_query() {
        let endpoint = Url::parse("http://localhost:8080/w/api.php?stale=1").unwrap();
        let query = SearchQuery::parse(Some("Redis")).unwrap();
        assert_eq!(
            query.page_url(&endpoint).as_str(),
            "http://localhost:8080/w/api.php?action=parse&format=json&section=0&page=Redis"
        );
    }
}
