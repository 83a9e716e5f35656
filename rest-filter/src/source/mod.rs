//! Filter sources: the ordered key/value mapping a filter is compiled from.
//!
//! Build one by hand, from a raw query string, or from a JSON object body.
//!
//! ```
//! use rest_filter::{FilterSource, Value};
//!
//! let mut source = FilterSource::new();
//! source.insert("id:gt", "2");
//! source.insert("tag", vec!["rust", "sql"]);
//!
//! let from_query = FilterSource::from_query_string("id:gt=2&tag[]=rust&tag[]=sql").unwrap();
//! assert_eq!(source, from_query);
//!
//! let from_json = FilterSource::from_json(r#"{"id:gt": "2", "tag": ["rust", "sql"]}"#).unwrap();
//! assert_eq!(source, from_json);
//! ```

mod json;
mod query;

pub use query::url_decode;

use crate::Value;
use crate::constants::MAX_URL_DECODED_LEN;
use std::collections::HashMap;
use std::fmt;

/// Error returned when a filter source cannot be read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceError {
    /// Invalid JSON syntax or encoding.
    InvalidJson,
    /// The JSON document is not an object.
    ExpectedObject,
    /// A JSON value that is not a string, number, null or array of those.
    UnsupportedValue {
        /// The key holding the value.
        key: String,
    },
    /// A decoded query-string key or value exceeds the size limit.
    TooLong,
    /// Array nesting deeper than the limit.
    TooDeep {
        /// The key holding the value.
        key: String,
    },
    /// More distinct keys than the reader accepts.
    TooManyKeys {
        /// The configured maximum.
        max: usize,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "Invalid JSON syntax or encoding"),
            Self::ExpectedObject => write!(f, "Expected JSON object"),
            Self::UnsupportedValue { key } => {
                write!(f, "Unsupported value for filter key '{key}'")
            },
            Self::TooLong => write!(
                f,
                "url decoded output exceeds maximum length ({}KB limit)",
                MAX_URL_DECODED_LEN / 1024
            ),
            Self::TooDeep { key } => write!(f, "Value for filter key '{key}' is nested too deeply"),
            Self::TooManyKeys { max } => write!(f, "Filter source has more than {max} keys"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Insertion-ordered mapping from filter key to value.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position in the compiled clause.
///
/// Order follows the source: query strings keep the order the client wrote,
/// JSON bodies come out sorted by key because the parsed object is a
/// `BTreeMap`. `{"title:like": "a", "id:gt": 1}` therefore compiles the `id`
/// term first.
///
/// Readers stop with [`SourceError::TooManyKeys`] as soon as the distinct
/// key count passes the limit, before the rest of the input is decoded.
#[derive(Clone, Default)]
pub struct FilterSource {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl FilterSource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            },
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fail once more than `max` distinct keys have been read.
    fn check_limit(&self, max: usize) -> Result<(), SourceError> {
        if self.entries.len() > max {
            return Err(SourceError::TooManyKeys { max });
        }
        Ok(())
    }

    /// Run `f` on the array stored under `key`, replacing any scalar or creating it.
    fn update_array(&mut self, key: &str, f: impl FnOnce(&mut Vec<Value>)) {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.index.insert(key.to_string(), pos);
                self.entries.push((key.to_string(), Value::Array(Vec::new())));
                pos
            },
        };
        let slot = &mut self.entries[pos].1;
        if let Value::Array(items) = &mut *slot {
            f(items);
        } else {
            let mut items = Vec::new();
            f(&mut items);
            *slot = Value::Array(items);
        }
    }
}

/// Two sources are equal when they hold the same keys and values in the same order.
impl PartialEq for FilterSource {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for FilterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        source.extend(iter);
        source
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for FilterSource {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
