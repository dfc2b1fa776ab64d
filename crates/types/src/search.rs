//! Query-string parameters for log search requests.
//!
//! [`SearchParams`] is the wire contract between callers and the log
//! backend: an ordered list of key/value pairs serialized verbatim as the
//! request query string. [`LogQuery`] is a typed convenience that produces
//! the parameters the backend understands.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::ServiceName;

/// Ordered query-string parameters.
///
/// Keys may repeat. Insertion order is preserved exactly and no key is
/// validated, added or removed when the parameters are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    /// Append a pair after all existing pairs.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Builder-style [`SearchParams::append`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Replace the first pair named `key` and drop any later duplicates.
    ///
    /// The replaced pair keeps its position; a missing key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(existing, _)| *existing == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(existing, _)| {
                    if *existing != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key, value)),
        }
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Remove every pair named `key`. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|(existing, _)| existing != key);
        before != self.pairs.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(existing, _)| existing == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize as an `application/x-www-form-urlencoded` string without a
    /// leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K, V> FromIterator<(K, V)> for SearchParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for SearchParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.pairs
            .extend(iter.into_iter().map(|(key, value)| (key.into(), value.into())));
    }
}

impl IntoIterator for SearchParams {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Query parameter names understood by the log backend.
pub mod keys {
    pub const SERVICE: &str = "service";
    pub const EXPR: &str = "expr";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const LIMIT: &str = "limit";
    pub const SKIP: &str = "skip";
}

/// Typed log search filter.
///
/// Converts into [`SearchParams`] with keys in a fixed order (`service`,
/// `expr`, `start`, `end`, `limit`, `skip`); unset fields are omitted.
/// Time bounds are sent as unix timestamps in microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Service whose logs are searched. The backend matches it as a
    /// process-id prefix.
    pub service: ServiceName,
    /// Backend filter expression. The backend falls back to a
    /// case-insensitive message match when it cannot parse it.
    pub expr: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl LogQuery {
    pub fn new(service: impl Into<ServiceName>) -> Self {
        Self {
            service: service.into(),
            expr: None,
            start: None,
            end: None,
            limit: None,
            skip: None,
        }
    }

    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    /// Restrict results to the `[start, end]` time range. Either bound may be open.
    pub fn range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn to_search_params(&self) -> SearchParams {
        let mut params = SearchParams::new().with(keys::SERVICE, self.service.as_str());
        if let Some(expr) = self.expr.as_deref().filter(|expr| !expr.trim().is_empty()) {
            params.append(keys::EXPR, expr);
        }
        if let Some(start) = self.start {
            params.append(keys::START, start.timestamp_micros().to_string());
        }
        if let Some(end) = self.end {
            params.append(keys::END, end.timestamp_micros().to_string());
        }
        if let Some(limit) = self.limit {
            params.append(keys::LIMIT, limit.to_string());
        }
        if let Some(skip) = self.skip {
            params.append(keys::SKIP, skip.to_string());
        }
        params
    }
}

impl From<&LogQuery> for SearchParams {
    fn from(query: &LogQuery) -> Self {
        query.to_search_params()
    }
}

impl From<LogQuery> for SearchParams {
    fn from(query: LogQuery) -> Self {
        query.to_search_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn query_string_preserves_order_and_duplicates() {
        let params = SearchParams::new()
            .with("service", "api")
            .with("level", "ERROR")
            .with("level", "WARN")
            .with("expr", "status >= 500 and path = '/a b'");

        let query = params.to_query_string();
        assert_eq!(
            query,
            "service=api&level=ERROR&level=WARN&expr=status+%3E%3D+500+and+path+%3D+%27%2Fa+b%27"
        );
        assert_eq!(SearchParams::parse(&query), params);
    }

    #[test]
    fn parse_ignores_leading_question_mark() {
        let params = SearchParams::parse("?a=1&b=&a=3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", ""), ("a", "3")]);
        assert!(SearchParams::parse("").is_empty());
    }

    #[test]
    fn set_replaces_first_and_drops_duplicates() {
        let mut params: SearchParams = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        params.set("a", "9");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "9"), ("b", "2")]);

        params.set("c", "4");
        assert_eq!(params.get("c"), Some("4"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn delete_and_get_all() {
        let mut params: SearchParams = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
        assert!(params.delete("a"));
        assert!(!params.delete("a"));
        assert!(!params.contains_key("a"));
        assert_eq!(params.to_string(), "b=2");
    }

    #[test]
    fn log_query_builds_backend_params_in_order() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let query = LogQuery::new("checkout")
            .expr("level = 'ERROR'")
            .range(Some(start), None)
            .limit(50)
            .skip(100);

        let params = query.to_search_params();
        let keys: Vec<_> = params.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["service", "expr", "start", "limit", "skip"]);
        assert_eq!(params.get("start"), Some("1704067200000000"));
        assert_eq!(params.get("limit"), Some("50"));
    }

    #[test]
    fn log_query_omits_blank_expr() {
        let params = SearchParams::from(LogQuery::new("checkout").expr("   "));
        assert_eq!(params.to_query_string(), "service=checkout");
    }
}
