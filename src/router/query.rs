//! Query-string extraction.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A query parameter value: single, or every value of a repeated key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value of the parameter
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::One(v) => Some(v),
            QueryValue::Many(values) => values.first().map(String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Parsed query string; keys are ordered so the serialized form is stable
pub type Query = BTreeMap<String, QueryValue>;

/// Parse a query string (without the leading `?`).
///
/// `+` is read as a space and each `key=value` pair is percent-decoded
/// before splitting at the first `=`. A key without `=` gets an empty value;
/// a repeated key collects all of its values in order.
///
/// ```rust
/// use fsrouter::router::{extract_query, QueryValue};
///
/// let query = extract_query(Some("a=1&a=2&b"));
/// assert_eq!(query["a"], QueryValue::Many(vec!["1".into(), "2".into()]));
/// assert_eq!(query["b"], QueryValue::One(String::new()));
/// ```
#[must_use]
pub fn extract_query(search: Option<&str>) -> Query {
    let mut query = Query::new();
    let Some(search) = search.filter(|s| !s.is_empty()) else {
        return query;
    };

    for pair in search.split('&').filter(|p| !p.is_empty()) {
        let spaced = pair.replace('+', " ");
        let decoded = decode(&spaced);
        let (key, value) = decoded.split_once('=').unwrap_or((decoded.as_ref(), ""));

        match query.get_mut(key) {
            Some(existing) => existing.push(value.to_string()),
            None => {
                query.insert(key.to_string(), QueryValue::One(value.to_string()));
            }
        }
    }

    query
}

/// Percent-decode `raw`, keeping it verbatim when it is not valid UTF-8 after
/// decoding.
pub(crate) fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
