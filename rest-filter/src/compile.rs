//! Filter compilation: source mapping in, `WHERE` clause out.

use crate::command::Escaped;
use crate::constants::max_filter_keys;
use crate::escape::Escaper;
use crate::key::{FieldSpec, ParsedKey};
use crate::source::FilterSource;
use crate::policy::FieldPolicy;
use crate::{Command, Value};
use std::fmt;

/// Error returned when a filter cannot be compiled.
///
/// Any error aborts the whole filter; no partial clause is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// Field rejected by the [`FieldPolicy`].
    FieldNotAllowed {
        /// The rejected field.
        field: String,
    },
    /// No command with this name exists.
    CommandNotSupported {
        /// The command name as written in the key.
        command: String,
    },
    /// The value does not have the shape the command needs.
    InvalidArguments {
        /// The command that rejected its arguments.
        command: Command,
        /// The field the command was applied to.
        field: String,
        /// Description of what was expected.
        expected: &'static str,
    },
    /// The source has more keys than the compiler accepts.
    TooManyKeys {
        /// The configured maximum.
        max: usize,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotAllowed { field } => write!(f, "Field '{field}' is not accessible"),
            Self::CommandNotSupported { command } => {
                write!(f, "Filter command '{command}' is not supported")
            },
            Self::InvalidArguments {
                command,
                field,
                expected,
            } => write!(f, "Filter command '{command}' on '{field}' expects {expected}"),
            Self::TooManyKeys { max } => write!(f, "Filter has more than {max} keys"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Compiles filter sources for one table.
///
/// ```
/// use rest_filter::{FilterCompiler, FilterSource, MySql};
///
/// let source = FilterSource::from_query_string("id=2&title:like=big").unwrap();
/// let filter = FilterCompiler::new("items", MySql)
///     .allow_fields(&["id", "title"])
///     .compile(&source)
///     .unwrap();
///
/// assert_eq!(
///     filter.where_clause().as_deref(),
///     Some("WHERE (`items`.`id` = 2) AND (`items`.`title` LIKE '%' 'big' '%')")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FilterCompiler<E: Escaper> {
    escaper: E,
    table: String,
    policy: FieldPolicy,
    max_keys: usize,
}

impl<E: Escaper> FilterCompiler<E> {
    /// Create a compiler for `table` using `escaper`.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a plain identifier: an ASCII letter
    /// or `_`, then letters, digits or `_`, at most 64 bytes. The table comes
    /// from code, never from the request.
    pub fn new(table: impl Into<String>, escaper: E) -> Self {
        let table = table.into();
        assert!(
            is_table_name(&table),
            "table name '{table}' is not a plain identifier"
        );
        Self {
            escaper,
            table,
            policy: FieldPolicy::new(),
            max_keys: max_filter_keys(),
        }
    }

    /// Only allow these fields. Empty = allow all.
    pub fn allow_fields(mut self, fields: &[&str]) -> Self {
        self.policy = self.policy.allow_fields(fields);
        self
    }

    /// Never allow these fields.
    pub fn deny_fields(mut self, fields: &[&str]) -> Self {
        self.policy = self.policy.deny_fields(fields);
        self
    }

    /// Replace the whole field policy.
    pub fn policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Maximum number of keys accepted (default from `REST_FILTER_MAX_KEYS`).
    pub const fn max_keys(mut self, max: usize) -> Self {
        self.max_keys = max;
        self
    }

    /// The table fields are qualified with, unescaped.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Compile every key of `source`, AND-joined in source order.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] hit by any key.
    pub fn compile(&self, source: &FilterSource) -> Result<CompiledFilter, CompileError> {
        if source.len() > self.max_keys {
            return Err(CompileError::TooManyKeys { max: self.max_keys });
        }

        let table = self.escaper.field(&self.table);
        let terms = source
            .iter()
            .map(|(key, value)| self.compile_key(&table, key, value))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(table = %self.table, terms = terms.len(), "compiled filter");

        let expression = (!terms.is_empty()).then(|| terms.join(" AND "));
        Ok(CompiledFilter { expression })
    }

    fn compile_key(&self, table: &str, key: &str, value: &Value) -> Result<String, CompileError> {
        tracing::trace!(key, "compiling filter key");

        let parsed = ParsedKey::parse(key, value.clone())?;
        let args = self.escape_args(&parsed.value);

        match &parsed.field {
            FieldSpec::Single(field) => self.compile_field(table, field, &parsed.commands, &args),
            FieldSpec::Group(fields) => {
                let clauses = fields
                    .iter()
                    .map(|field| self.compile_field(table, field, &parsed.commands, &args))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", clauses.join(" OR ")))
            },
        }
    }

    /// Compile the command chain for one field.
    ///
    /// A single command yields its wrapped fragment; a chain is OR-joined and
    /// wrapped once more.
    fn compile_field(
        &self,
        table: &str,
        field: &str,
        commands: &[Command],
        args: &Escaped,
    ) -> Result<String, CompileError> {
        self.policy.check(field)?;
        let qualified = format!("{table}.{}", self.escaper.field(field));

        if let [command] = commands {
            return exec(*command, field, &qualified, args);
        }

        let clauses = commands
            .iter()
            .map(|command| exec(*command, field, &qualified, args))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", clauses.join(" OR ")))
    }

    fn escape_args(&self, value: &Value) -> Escaped {
        match value {
            Value::Array(items) => {
                Escaped::List(items.iter().map(|item| self.escape_args(item)).collect())
            },
            scalar => Escaped::Scalar(self.escaper.value(scalar)),
        }
    }
}

/// Longest table name accepted (MySQL's identifier limit).
const MAX_TABLE_NAME_LEN: usize = 64;

fn is_table_name(name: &str) -> bool {
    let Some((first, rest)) = name.as_bytes().split_first() else {
        return false;
    };
    name.len() <= MAX_TABLE_NAME_LEN
        && (first.is_ascii_alphabetic() || *first == b'_')
        && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

fn exec(
    command: Command,
    field: &str,
    qualified: &str,
    args: &Escaped,
) -> Result<String, CompileError> {
    command
        .build(qualified, args)
        .map(|fragment| format!("({fragment})"))
        .ok_or_else(|| CompileError::InvalidArguments {
            command,
            field: field.to_string(),
            expected: command.expects(),
        })
}

/// The result of compiling a filter source.
///
/// Empty when the source had no keys; in that case there is no `WHERE`
/// clause at all rather than an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "CompiledFilter must be appended to a query"]
pub struct CompiledFilter {
    expression: Option<String>,
}

impl CompiledFilter {
    /// The boolean expression without the `WHERE` keyword.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// `WHERE <expression>`, or `None` for an empty filter.
    ///
    /// Callers must not prepend `WHERE` themselves.
    pub fn where_clause(&self) -> Option<String> {
        self.expression.as_ref().map(|e| format!("WHERE {e}"))
    }

    /// Returns `true` if nothing was compiled.
    pub const fn is_empty(&self) -> bool {
        self.expression.is_none()
    }

    /// Take the expression out.
    pub fn into_expression(self) -> Option<String> {
        self.expression
    }
}

/// Renders the `WHERE` clause, or nothing for an empty filter.
impl fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(e) => write!(f, "WHERE {e}"),
            None => Ok(()),
        }
    }
}

/// Compile `source` for `table` with no field restrictions.
///
/// ```
/// use rest_filter::{Ansi, FilterSource, compile_filter};
///
/// let source = FilterSource::from_query_string("id[]=1&id[]=2").unwrap();
/// let filter = compile_filter("items", &source, Ansi).unwrap();
/// assert_eq!(filter.to_string(), r#"WHERE ("items"."id" IN ('1', '2'))"#);
/// ```
///
/// # Panics
///
/// Panics if the table name is not a plain identifier, as [`FilterCompiler::new`].
pub fn compile_filter<E: Escaper>(
    table: &str,
    source: &FilterSource,
    escaper: E,
) -> Result<CompiledFilter, CompileError> {
    FilterCompiler::new(table, escaper).compile(source)
}
