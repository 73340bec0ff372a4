//! Result payloads and their provenance field

use serde_json::{Map, Value};

/// A JSON object as returned by the upstream API
pub type JsonObject = Map<String, Value>;

/// Name of the provenance field merged into every payload
pub const SOURCE_FIELD: &str = "source";

/// Where a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Served from the cache store
    Cache,
    /// Fetched from the upstream content API on this request
    Upstream,
}

impl Source {
    /// Wire value of the `source` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "Redis Cache",
            Self::Upstream => "Upstream API",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns a copy of `body` carrying `source` as its provenance
///
/// The provenance value wins over any `source` key the upstream body carries.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wikiproxy_core::{with_source, Source};
///
/// let body = json!({"parse": {"title": "OpenAI"}});
/// let tagged = with_source(body.as_object().unwrap(), Source::Upstream);
/// assert_eq!(tagged["source"], "Upstream API");
/// assert_eq!(tagged["parse"]["title"], "OpenAI");
/// ```
pub fn with_source(body: &JsonObject, source: Source) -> JsonObject {
    let mut tagged = body.clone();
    tagged.insert(
        SOURCE_FIELD.to_string(),
        Value::String(source.as_str().to_string()),
    );
    tagged
}
