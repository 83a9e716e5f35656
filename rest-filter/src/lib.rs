// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // SQL keywords in docs
#![allow(clippy::module_name_repetitions)] // FilterSource in source, etc.
#![allow(clippy::return_self_not_must_use)] // Builder methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::cast_precision_loss)] // u64 above i64::MAX falls back to f64
#![allow(clippy::indexing_slicing)] // Indices come from the key index or len() right before use

//! # rest-filter - REST Query Filters to SQL
//!
//! Compiles the filter part of a REST request (`field[:command]*=value`) into
//! a SQL `WHERE` clause for a single table.
//!
//! ## Quick Start
//!
//! ```
//! use rest_filter::{FilterCompiler, FilterSource, MySql};
//!
//! let source = FilterSource::from_query_string(
//!     "id:gt=2&title:like=big&(father,son):prefix=Luke",
//! )
//! .unwrap();
//!
//! let filter = FilterCompiler::new("people", MySql).compile(&source).unwrap();
//!
//! assert_eq!(
//!     filter.to_string(),
//!     "WHERE (`people`.`id` > '2') \
//!      AND (`people`.`title` LIKE '%' 'big' '%') \
//!      AND ((`people`.`father` LIKE 'Luke' '%') OR (`people`.`son` LIKE 'Luke' '%'))"
//! );
//! ```
//!
//! ## Key Syntax
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `id=2` | `eq`, numeric text becomes a number |
//! | `id[]=1&id[]=2` | `in` |
//! | `title:like=big` | explicit command |
//! | `likes:null:not=0` | command chain, OR-joined |
//! | `(father,son):like=Luke` | field group, OR-joined |
//!
//! ## Commands
//!
//! | Command | SQL |
//! |---------|-----|
//! | `eq` | `field = v` |
//! | `not` | `field != v` |
//! | `gt` | `field > v` |
//! | `gte` | `field >= v` |
//! | `null` | `field IS NULL` |
//! | `like` | `field LIKE '%' v '%'` |
//! | `prefix` | `field LIKE v '%'` |
//! | `in` | `field IN (v1, v2)` |
//! | `range` | `(field >= min AND field < max) OR ...` |
//! | `notrange` | `(field < min AND field >= max) AND ...` |
//!
//! ## Field Access
//!
//! Field names come from the client. Restrict them with an allow list and a
//! deny list; a rejected field fails the whole filter:
//!
//! ```
//! use rest_filter::{Ansi, CompileError, FilterCompiler, FilterSource};
//!
//! let compiler = FilterCompiler::new("users", Ansi)
//!     .allow_fields(&["name", "email"])
//!     .deny_fields(&["password"]);
//!
//! let source = FilterSource::new().with("password:prefix", "a");
//! assert_eq!(
//!     compiler.compile(&source),
//!     Err(CompileError::FieldNotAllowed { field: "password".into() })
//! );
//! ```

pub mod constants;

mod command;
mod compile;
mod escape;
mod key;
mod policy;
mod source;
mod types;

pub use command::{Command, Escaped};
pub use compile::{CompileError, CompiledFilter, FilterCompiler, compile_filter};
pub use escape::{Ansi, Escaper, MySql};
pub use key::{FieldSpec, ParsedKey};
pub use policy::FieldPolicy;
pub use source::{FilterSource, SourceError, url_decode};
pub use types::Value;

/// Prelude module for convenient imports.
///
/// ```
/// use rest_filter::prelude::*;
///
/// let source = FilterSource::new().with("id", "7");
/// let filter = compile_filter("items", &source, Ansi).unwrap();
/// assert_eq!(filter.expression(), Some(r#"("items"."id" = 7)"#));
/// ```
pub mod prelude {
    pub use crate::{
        Ansi, Command, CompileError, CompiledFilter, Escaper, FieldPolicy, FilterCompiler,
        FilterSource, MySql, SourceError, Value, compile_filter,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
