//! Ordered query-string parameters.

use std::fmt;
use url::form_urlencoded;

/// Query-string parameters in their original order.
///
/// Parsed from and serialized to `application/x-www-form-urlencoded`.
/// Several managers share one query string; each edits only the names it
/// owns and leaves everything else untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string. A leading `?` is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use viewsync::codec::QueryParams;
    /// let params = QueryParams::parse("?page=2&filter_status=active");
    /// assert_eq!(params.get("filter_status"), Some("active"));
    /// assert_eq!(params.len(), 2);
    /// ```
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or delete `name`.
    ///
    /// `Some` replaces the first occurrence in place (appending when absent)
    /// and drops duplicates; `None` removes every occurrence.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        let Some(value) = value else {
            self.remove(name);
            return;
        };

        match self.pairs.iter().position(|(key, _)| key == name) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(key, _)| {
                    let keep = index == first || key != name;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((name.to_owned(), value)),
        }
    }

    /// Append a pair without touching existing ones.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Remove every occurrence of `name`.
    pub fn remove(&mut self, name: &str) {
        self.pairs.retain(|(key, _)| key != name);
    }

    /// Remove every parameter whose name starts with `prefix`.
    pub fn remove_prefixed(&mut self, prefix: &str) {
        self.pairs.retain(|(key, _)| !key.starts_with(prefix));
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
