//! Field allow/deny lists for user-provided filters.
//!
//! ```
//! use rest_filter::FieldPolicy;
//!
//! let policy = FieldPolicy::new()
//!     .allow_fields(&["title", "author", "password_hash"])
//!     .deny_fields(&["password_hash"]);
//!
//! assert!(policy.is_allowed("title"));
//! assert!(!policy.is_allowed("password_hash"));
//! assert!(!policy.is_allowed("internal_notes"));
//! ```

use crate::CompileError;

/// Which fields a filter may reference.
///
/// Two independent lists:
/// 1. `allowed` - whitelist; empty means every field is allowed
/// 2. `denied` - blacklist; always wins over `allowed`
///
/// The compiler checks every field before compiling any of its commands,
/// including each member of a `(a,b)` field group, and rejects the whole
/// filter on the first violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct FieldPolicy {
    /// Allowed field names. Empty = allow all fields.
    pub allowed: Vec<String>,
    /// Denied field names.
    pub denied: Vec<String>,
}

impl FieldPolicy {
    /// A policy that allows every field.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allowed: Vec::new(),
            denied: Vec::new(),
        }
    }

    /// Set allowed fields (whitelist).
    #[must_use]
    pub fn allow_fields(mut self, fields: &[&str]) -> Self {
        self.allowed = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Set denied fields (blacklist).
    #[must_use]
    pub fn deny_fields(mut self, fields: &[&str]) -> Self {
        self.denied = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Whether `field` may appear in a filter.
    pub fn is_allowed(&self, field: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|f| f == field);
        (self.allowed.is_empty() || listed(&self.allowed)) && !listed(&self.denied)
    }

    /// Check `field`, returning [`CompileError::FieldNotAllowed`] on failure.
    pub fn check(&self, field: &str) -> Result<(), CompileError> {
        if self.is_allowed(field) {
            Ok(())
        } else {
            Err(CompileError::FieldNotAllowed {
                field: field.to_string(),
            })
        }
    }
}
