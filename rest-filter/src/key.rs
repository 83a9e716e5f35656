//! Filter key parsing.
//!
//! A key has the shape `field[:command]*` or `(field1,field2,...)[:command]*`:
//!
//! | Key | Value | Field spec | Commands |
//! |-----|-------|------------|----------|
//! | `id` | `2` | `id` | `eq` (value coerced to `2`) |
//! | `id[]` | `[1, 2]` | `id` | `in` |
//! | `title:like` | `big` | `title` | `like` |
//! | `likes:null:not` | `0` | `likes` | `null`, `not` |
//! | `(father,son):like` | `Luke` | `father`, `son` | `like` |

use crate::constants::COMMAND_SEPARATOR;
use crate::{Command, CompileError, Value};

/// The field part of a key: one field or a group sharing the command chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// A single field name, used literally.
    Single(String),
    /// `(a,b,...)`: every member is compiled and the results OR-joined.
    Group(Vec<String>),
}

impl FieldSpec {
    /// Classify a field spec.
    ///
    /// Only a spec that starts with `(`, ends with `)` and has a non-empty
    /// body without further parentheses is a group. Anything else, including
    /// an unterminated `(a,b`, is a literal field name.
    ///
    /// ```
    /// use rest_filter::FieldSpec;
    ///
    /// assert_eq!(
    ///     FieldSpec::parse("(father,son)"),
    ///     FieldSpec::Group(vec!["father".into(), "son".into()])
    /// );
    /// assert_eq!(FieldSpec::parse("(father,son"), FieldSpec::Single("(father,son".into()));
    /// ```
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            Some(body) if !body.is_empty() && !body.contains(['(', ')']) => {
                Self::Group(body.split(',').map(str::to_string).collect())
            },
            _ => Self::Single(spec.to_string()),
        }
    }

    /// The field names this spec covers, in order.
    pub fn fields(&self) -> &[String] {
        match self {
            Self::Single(field) => std::slice::from_ref(field),
            Self::Group(fields) => fields,
        }
    }

    /// Returns `true` for [`FieldSpec::Group`].
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// A filter key split into field spec, command chain and argument value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ParsedKey {
    /// Field or field group.
    pub field: FieldSpec,
    /// Commands in the order written; never empty.
    pub commands: Vec<Command>,
    /// Argument value, after shortcut coercion.
    pub value: Value,
}

impl ParsedKey {
    /// Parse a key and its value.
    ///
    /// Without an explicit command the chain is inferred: `in` for a list,
    /// otherwise `eq`, turning numeric-looking text into a number. Explicit
    /// commands never coerce.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::CommandNotSupported`] for an unknown command
    /// name, including the empty name in `field:`.
    ///
    /// ```
    /// use rest_filter::{Command, FieldSpec, ParsedKey, Value};
    ///
    /// let key = ParsedKey::parse("id", Value::from("2")).unwrap();
    /// assert_eq!(key.field, FieldSpec::Single("id".into()));
    /// assert_eq!(key.commands, vec![Command::Eq]);
    /// assert_eq!(key.value, Value::Int(2));
    ///
    /// let key = ParsedKey::parse("id:gt", Value::from("2")).unwrap();
    /// assert_eq!(key.commands, vec![Command::Gt]);
    /// assert_eq!(key.value, Value::from("2"));
    /// ```
    pub fn parse(key: &str, value: Value) -> Result<Self, CompileError> {
        let (spec, chain) = match key.split_once(COMMAND_SEPARATOR) {
            Some((spec, chain)) => (spec, Some(chain)),
            None => (key, None),
        };

        let (commands, value) = match chain {
            Some(chain) => {
                let commands = chain
                    .split(COMMAND_SEPARATOR)
                    .map(str::parse)
                    .collect::<Result<Vec<Command>, _>>()?;
                (commands, value)
            },
            None if value.is_array() => (vec![Command::In], value),
            None => (vec![Command::Eq], value.coerce_numeric()),
        };

        Ok(Self {
            field: FieldSpec::parse(spec),
            commands,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(key: &str, value: impl Into<Value>) -> ParsedKey {
        ParsedKey::parse(key, value.into()).unwrap()
    }

    #[test]
    fn test_shortcut_numeric_scalar_is_eq_with_number() {
        let key = parse("id", "2");
        assert_eq!(key.field, FieldSpec::Single("id".into()));
        assert_eq!(key.commands, vec![Command::Eq]);
        assert_eq!(key.value, Value::Int(2));

        assert_eq!(parse("price", "9.5").value, Value::Float(9.5));
    }

    #[test]
    fn test_shortcut_text_scalar_is_eq_unchanged() {
        let key = parse("title", "big");
        assert_eq!(key.commands, vec![Command::Eq]);
        assert_eq!(key.value, Value::from("big"));
    }

    #[test]
    fn test_shortcut_list_is_in() {
        let key = parse("id", vec!["1", "2"]);
        assert_eq!(key.commands, vec![Command::In]);
        // List items are not coerced
        assert_eq!(key.value, Value::from(vec!["1", "2"]));
    }

    #[test]
    fn test_explicit_command_does_not_coerce() {
        let key = parse("id:eq", "2");
        assert_eq!(key.commands, vec![Command::Eq]);
        assert_eq!(key.value, Value::from("2"));
    }

    #[test]
    fn test_command_chain_keeps_order() {
        let key = parse("likes:null:not", "0");
        assert_eq!(key.field, FieldSpec::Single("likes".into()));
        assert_eq!(key.commands, vec![Command::Null, Command::Not]);
    }

    #[test]
    fn test_unknown_command_in_chain() {
        let err = ParsedKey::parse("likes:notnull:not", Value::from("0")).unwrap_err();
        assert_eq!(
            err,
            CompileError::CommandNotSupported {
                command: "notnull".into()
            }
        );
    }

    #[test]
    fn test_empty_command_is_unknown() {
        let err = ParsedKey::parse("id:", Value::from("1")).unwrap_err();
        assert_eq!(
            err,
            CompileError::CommandNotSupported {
                command: String::new()
            }
        );
    }

    #[test]
    fn test_group_spec() {
        let key = parse("(father,son):like", "Luke");
        assert_eq!(
            key.field,
            FieldSpec::Group(vec!["father".into(), "son".into()])
        );
        assert!(key.field.is_group());
        assert_eq!(key.field.fields(), ["father", "son"]);
    }

    #[test]
    fn test_group_without_command_uses_shortcut() {
        let key = parse("(a,b)", "3");
        assert!(key.field.is_group());
        assert_eq!(key.commands, vec![Command::Eq]);
        assert_eq!(key.value, Value::Int(3));
    }

    #[test]
    fn test_malformed_groups_fall_back_to_literal() {
        for spec in ["(a,b", "a,b)", "()", "x(a,b)", "(a)(b)", "((a,b))"] {
            assert_eq!(
                FieldSpec::parse(spec),
                FieldSpec::Single(spec.to_string()),
                "{spec}"
            );
        }
    }

    #[test]
    fn test_single_member_group() {
        assert_eq!(FieldSpec::parse("(a)"), FieldSpec::Group(vec!["a".into()]));
    }

    #[test]
    fn test_group_members_are_not_trimmed() {
        assert_eq!(
            FieldSpec::parse("(a, b)"),
            FieldSpec::Group(vec!["a".into(), " b".into()])
        );
    }
}
