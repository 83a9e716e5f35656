//! Escaping adapters for identifiers and literal values.
//!
//! The compiler never writes user input into SQL on its own: every field name
//! and every argument goes through an [`Escaper`] first, and the returned text
//! is embedded verbatim. Implement the trait to plug in the escaping rules of
//! your database driver, or use one of the adapters shipped here.

use crate::Value;

/// Escapes identifiers and values for embedding into SQL.
///
/// Both methods must be pure: the compiler may call them any number of times
/// and in any order.
pub trait Escaper {
    /// Escape a field (or table) identifier.
    fn field(&self, name: &str) -> String;

    /// Escape a scalar value into a SQL literal.
    ///
    /// The compiler only passes scalars; it walks arrays itself.
    fn value(&self, value: &Value) -> String;
}

impl<E: Escaper + ?Sized> Escaper for &E {
    #[inline]
    fn field(&self, name: &str) -> String {
        (**self).field(name)
    }

    #[inline]
    fn value(&self, value: &Value) -> String {
        (**self).value(value)
    }
}

impl<E: Escaper + ?Sized> Escaper for Box<E> {
    #[inline]
    fn field(&self, name: &str) -> String {
        (**self).field(name)
    }

    #[inline]
    fn value(&self, value: &Value) -> String {
        (**self).value(value)
    }
}

/// MySQL escaping.
///
/// Identifiers are wrapped in backticks, text in single quotes with
/// backslash escapes. `like` and `prefix` emit adjacent literals
/// (`'%' 'x' '%'`), which MySQL concatenates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Escaper for MySql {
    fn field(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("''"),
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\x1a' => out.push_str("\\Z"),
                        _ => out.push(c),
                    }
                }
                out.push('\'');
                out
            },
            Value::Array(items) => join_values(self, items),
            number => number_literal(number),
        }
    }
}

/// ANSI SQL escaping (Postgres, `SQLite`).
///
/// Identifiers are wrapped in double quotes, text in single quotes with
/// embedded quotes doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Escaper for Ansi {
    fn field(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Array(items) => join_values(self, items),
            number => number_literal(number),
        }
    }
}

fn number_literal(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(x) if x.is_finite() => x.to_string(),
        _ => "NULL".to_string(),
    }
}

fn join_values<E: Escaper>(escaper: &E, items: &[Value]) -> String {
    items
        .iter()
        .map(|item| escaper.value(item))
        .collect::<Vec<_>>()
        .join(", ")
}
