//! Filter commands and their clause builders.
//!
//! Every command maps to exactly one builder function through a static
//! `match`; the set is closed and never changes at runtime. Builders receive
//! an already escaped, table-qualified field and escaped arguments, and return
//! a fragment without surrounding parentheses.
//!
//! | Command | Arguments | SQL |
//! |---------|-----------|-----|
//! | `eq` | value | `field = v` |
//! | `not` | value | `field != v` |
//! | `gt` | value | `field > v` |
//! | `gte` | value | `field >= v` |
//! | `null` | ignored | `field IS NULL` |
//! | `like` | value | `field LIKE '%' v '%'` |
//! | `prefix` | value | `field LIKE v '%'` |
//! | `in` | list | `field IN (v1, v2)` |
//! | `range` | list of `[min, max)` pairs | `(field >= min AND field < max) OR ...` |
//! | `notrange` | list of `[min, max)` pairs | `(field < min AND field >= max) AND ...` |

use crate::CompileError;
use std::fmt;
use std::str::FromStr;

/// Escaped arguments handed to a clause builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escaped {
    /// A single escaped literal.
    Scalar(String),
    /// An ordered list of escaped arguments.
    List(Vec<Escaped>),
}

/// Builds a clause fragment, or `None` when the arguments have the wrong shape.
type ClauseBuilder = fn(&str, &Escaped) -> Option<String>;

/// A filter command (`field:command=value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Command {
    /// Equal: `=`
    Eq,
    /// Not equal: `!=`
    Not,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Gte,
    /// Is null: `IS NULL`
    Null,
    /// Contains: `LIKE '%' v '%'`
    Like,
    /// Starts with: `LIKE v '%'`
    Prefix,
    /// In list: `IN (...)`
    In,
    /// Inside any of the half-open ranges.
    Range,
    /// Below every min and at or above every max.
    NotRange,
}

impl Command {
    /// Every registered command.
    pub const ALL: [Self; 10] = [
        Self::Eq,
        Self::Not,
        Self::Gt,
        Self::Gte,
        Self::Null,
        Self::Like,
        Self::Prefix,
        Self::In,
        Self::Range,
        Self::NotRange,
    ];

    /// Look up a command by name (ASCII case-insensitive).
    ///
    /// ```
    /// use rest_filter::Command;
    ///
    /// assert_eq!(Command::from_name("gte"), Some(Command::Gte));
    /// assert_eq!(Command::from_name("notRange"), Some(Command::NotRange));
    /// assert_eq!(Command::from_name("notnull"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
    }

    /// Canonical command name as written in filter keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Not => "not",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Null => "null",
            Self::Like => "like",
            Self::Prefix => "prefix",
            Self::In => "in",
            Self::Range => "range",
            Self::NotRange => "notrange",
        }
    }

    /// Human-readable argument shape, used in error messages.
    #[must_use]
    pub const fn expects(self) -> &'static str {
        match self {
            Self::Eq | Self::Not | Self::Gt | Self::Gte | Self::Like | Self::Prefix => {
                "a single value"
            },
            Self::Null => "no value",
            Self::In => "a non-empty list of values",
            Self::Range | Self::NotRange => "a non-empty list of [min, max] pairs",
        }
    }

    fn builder(self) -> ClauseBuilder {
        match self {
            Self::Eq => build_eq,
            Self::Not => build_not,
            Self::Gt => build_gt,
            Self::Gte => build_gte,
            Self::Null => build_null,
            Self::Like => build_like,
            Self::Prefix => build_prefix,
            Self::In => build_in,
            Self::Range => build_range,
            Self::NotRange => build_not_range,
        }
    }

    /// Build the clause fragment for an escaped field and escaped arguments.
    ///
    /// Returns `None` if `args` does not have the shape this command expects.
    ///
    /// ```
    /// use rest_filter::{Command, Escaped};
    ///
    /// let sql = Command::Gt.build("items.id", &Escaped::Scalar("2".into()));
    /// assert_eq!(sql.as_deref(), Some("items.id > 2"));
    /// ```
    #[must_use]
    pub fn build(self, field: &str, args: &Escaped) -> Option<String> {
        (self.builder())(field, args)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CompileError::CommandNotSupported {
            command: s.to_string(),
        })
    }
}

fn scalar(args: &Escaped) -> Option<&str> {
    match args {
        Escaped::Scalar(s) => Some(s),
        Escaped::List(_) => None,
    }
}

fn scalars(args: &Escaped) -> Option<Vec<&str>> {
    match args {
        Escaped::List(items) if !items.is_empty() => items.iter().map(scalar).collect(),
        _ => None,
    }
}

fn pairs(args: &Escaped) -> Option<Vec<(&str, &str)>> {
    let Escaped::List(items) = args else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match scalars(item)?.as_slice() {
            [min, max] => Some((*min, *max)),
            _ => None,
        })
        .collect()
}

fn build_eq(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} = {v}"))
}

fn build_not(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} != {v}"))
}

fn build_gt(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} > {v}"))
}

fn build_gte(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} >= {v}"))
}

fn build_null(field: &str, _args: &Escaped) -> Option<String> {
    Some(format!("{field} IS NULL"))
}

// The value is already a quoted literal; adjacency concatenates it with the wildcards.
fn build_like(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} LIKE '%' {v} '%'"))
}

fn build_prefix(field: &str, args: &Escaped) -> Option<String> {
    scalar(args).map(|v| format!("{field} LIKE {v} '%'"))
}

fn build_in(field: &str, args: &Escaped) -> Option<String> {
    scalars(args).map(|values| format!("{field} IN ({})", values.join(", ")))
}

fn build_range(field: &str, args: &Escaped) -> Option<String> {
    let conditions: Vec<String> = pairs(args)?
        .into_iter()
        .map(|(min, max)| format!("({field} >= {min} AND {field} < {max})"))
        .collect();
    Some(conditions.join(" OR "))
}

fn build_not_range(field: &str, args: &Escaped) -> Option<String> {
    let conditions: Vec<String> = pairs(args)?
        .into_iter()
        .map(|(min, max)| format!("({field} < {min} AND {field} >= {max})"))
        .collect();
    Some(conditions.join(" AND "))
}
