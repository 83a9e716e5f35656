//! Reading filter sources from raw URL query strings.
//!
//! Arrays follow the PHP `$_GET` bracket convention:
//!
//! | Query | Value |
//! |-------|-------|
//! | `id=2` | `"2"` |
//! | `id[]=1&id[]=2` | `["1", "2"]` |
//! | `f:range[0][]=0&f:range[0][]=10` | `[["0", "10"]]` |

use super::{FilterSource, SourceError};
use crate::Value;
use crate::constants::{MAX_ARRAY_DEPTH, MAX_URL_DECODED_LEN, max_filter_keys};

/// Decode `%XX` escapes and `+` as space.
///
/// Malformed escapes are kept literally; invalid UTF-8 is replaced.
///
/// # Errors
///
/// Returns [`SourceError::TooLong`] if the decoded output would exceed 64KB.
///
/// ```
/// use rest_filter::url_decode;
///
/// assert_eq!(url_decode("title%3Alike").unwrap(), "title:like");
/// assert_eq!(url_decode("big+deal").unwrap(), "big deal");
/// assert_eq!(url_decode("100%").unwrap(), "100%");
/// ```
pub fn url_decode(s: &str) -> Result<String, SourceError> {
    let input = s.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while let Some(&b) = input.get(i) {
        if out.len() >= MAX_URL_DECODED_LEN {
            return Err(SourceError::TooLong);
        }
        match b {
            b'%' => {
                let escaped = input
                    .get(i + 1)
                    .and_then(|&h| hex_value(h))
                    .zip(input.get(i + 2).and_then(|&l| hex_value(l)));
                if let Some((high, low)) = escaped {
                    out.push((high << 4) | low);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            },
            b'+' => out.push(b' '),
            _ => out.push(b),
        }
        i += 1;
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Split `name[a][b]` into `name` and `["a", "b"]`.
///
/// Keys whose brackets are not well formed are returned whole, without a path.
fn split_brackets(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    let (name, mut rest) = key.split_at(open);

    let mut path = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let Some((segment, tail)) = inner.split_once(']') else {
            return (key, Vec::new());
        };
        path.push(segment);
        rest = tail;
    }

    if rest.is_empty() {
        (name, path)
    } else {
        (key, Vec::new())
    }
}

/// Place `leaf` into `items` following the bracket `path`.
///
/// An empty or out-of-range segment appends; an in-range index addresses the
/// existing element.
fn place(items: &mut Vec<Value>, path: &[&str], leaf: Value) {
    let Some((segment, rest)) = path.split_first() else {
        return;
    };
    let existing = segment.parse::<usize>().ok().filter(|&i| i < items.len());

    if rest.is_empty() {
        match existing {
            Some(i) => items[i] = leaf,
            None => items.push(leaf),
        }
        return;
    }

    let i = existing.unwrap_or_else(|| {
        items.push(Value::Array(Vec::new()));
        items.len() - 1
    });
    if let Value::Array(inner) = &mut items[i] {
        place(inner, rest, leaf);
    } else {
        let mut inner = Vec::new();
        place(&mut inner, rest, leaf);
        items[i] = Value::Array(inner);
    }
}

impl FilterSource {
    /// Parse a raw query string (with or without the leading `?`).
    ///
    /// A repeated key without brackets keeps the last value. Pairs with an
    /// empty name are skipped. At most [`max_filter_keys`] distinct keys are
    /// read.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::TooLong`] for oversized keys or values,
    /// [`SourceError::TooDeep`] for keys nested deeper than four brackets and
    /// [`SourceError::TooManyKeys`] past the key limit.
    ///
    /// ```
    /// use rest_filter::{FilterSource, Value};
    ///
    /// let source = FilterSource::from_query_string(
    ///     "?price:range[0][]=0&price:range[0][]=10&(father,son):like=Luke",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(
    ///     source.get("price:range"),
    ///     Some(&Value::from(vec![Value::from(vec!["0", "10"])]))
    /// );
    /// assert_eq!(source.get("(father,son):like"), Some(&Value::from("Luke")));
    /// ```
    pub fn from_query_string(query: &str) -> Result<Self, SourceError> {
        Self::from_query_string_with_limit(query, max_filter_keys())
    }

    /// [`from_query_string`](Self::from_query_string) with an explicit key limit.
    ///
    /// Reading stops at the first pair that introduces key number `max + 1`;
    /// the remainder of the query is never decoded.
    ///
    /// # Errors
    ///
    /// See [`from_query_string`](Self::from_query_string).
    pub fn from_query_string_with_limit(query: &str, max: usize) -> Result<Self, SourceError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut source = Self::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = url_decode(raw_key)?;
            let value = Value::String(url_decode(raw_value)?);

            let (name, path) = split_brackets(&key);
            if name.is_empty() {
                continue;
            }
            if path.len() > MAX_ARRAY_DEPTH {
                return Err(SourceError::TooDeep {
                    key: name.to_string(),
                });
            }

            if path.is_empty() {
                source.insert(name, value);
            } else {
                source.update_array(name, |items| place(items, &path, value));
            }
            source.check_limit(max)?;
        }

        Ok(source)
    }
}
