//! Filter argument values.

use std::fmt;

/// A filter argument as received from the request.
///
/// Query-string values always start out as [`Value::String`]. Numbers only
/// appear through shortcut coercion (`id=2`) or typed sources such as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw text.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Ordered list (`field[]=a&field[]=b`). Nests one level for range pairs.
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Array`].
    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Convert numeric-looking text into [`Value::Int`] or [`Value::Float`].
    ///
    /// Anything else is returned unchanged.
    ///
    /// ```
    /// use rest_filter::Value;
    ///
    /// assert_eq!(Value::from("42").coerce_numeric(), Value::Int(42));
    /// assert_eq!(Value::from(" -1.5").coerce_numeric(), Value::Float(-1.5));
    /// assert_eq!(Value::from("Luke").coerce_numeric(), Value::from("Luke"));
    /// ```
    #[must_use]
    pub fn coerce_numeric(self) -> Self {
        match &self {
            Self::String(s) => parse_numeric(s).unwrap_or(self),
            _ => self,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Parse text the way an HTTP API client means a number.
///
/// Accepts surrounding whitespace, an optional sign, decimal digits with at
/// most one point, and an optional exponent. Rejects `inf`, `nan`, hex and
/// values that overflow to infinity.
pub(crate) fn parse_numeric(s: &str) -> Option<Value> {
    let t = s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    if !is_numeric_literal(t) {
        return None;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Some(Value::Int(i));
    }
    t.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(Value::Float)
}

fn is_numeric_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut digits = 0;
    let mut seen_point = false;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        i += 1;
    }
    if digits == 0 {
        return false;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exponent_start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == exponent_start {
            return false;
        }
    }

    i == bytes.len()
}
