//! scimfilter-parser: Parser for SCIM filter expressions
//!
//! This crate converts the textual filter expressions used by identity
//! provisioning protocols (SCIM, RFC 7644 section 3.4.2.2) into a nested
//! boolean/comparison tree that callers can evaluate against resource
//! attributes.
//!
//! # Quick Start
//!
//! ```rust
//! use scimfilter_parser::{FilterParser, Comparator, Criterion};
//!
//! let parser = FilterParser::new();
//! let filter = parser.parse(r#"userName eq "bjensen" and title pr"#)?;
//!
//! assert_eq!(filter.len(), 1);
//! let statement = &filter.statements()[0];
//! assert!(matches!(
//!     statement.criterion("title"),
//!     Some(Criterion::Compare { comparator: Comparator::Pr, value: None })
//! ));
//! # Ok::<(), scimfilter_parser::FilterError>(())
//! ```
//!
//! # Supported Syntax
//!
//! - **Comparisons**: `eq`, `ne`, `co`, `sw`, `ew`, `gt`, `lt`, `ge`, `le`
//!   followed by a number, quoted string, `true`, `false` or `null`
//! - **Presence**: `attr pr`
//! - **Logical operators**: `and`, `or`, `not`, where `and` binds tighter
//! - **Groups**: `(...)` and `[...]`, including complex attribute filters
//!   such as `emails[type eq "work" and value co "@example.com"]`
//!
//! # Output Shape
//!
//! Top-level statements are joined by `or`. Serialized to JSON, a statement
//! maps attribute paths to `[comparator, value]` pairs, with `"&&"` holding
//! parenthesized groups and `"!!"` holding negations:
//!
//! ```rust
//! let filter = scimfilter_parser::parse_filter("a eq 1 or not (b pr)")?;
//! assert_eq!(
//!     serde_json::to_string(&filter).unwrap(),
//!     r#"[{"a":["eq",1]},{"!!":{"b":["pr"]}}]"#
//! );
//! # Ok::<(), scimfilter_parser::FilterError>(())
//! ```
//!
//! # Error Handling
//!
//! Every failure is a [`FilterError`], reported as HTTP 400 with the SCIM
//! error type `invalidFilter`:
//!
//! ```rust
//! use scimfilter_parser::{parse_filter, FilterError};
//!
//! match parse_filter("(userName eq \"bjensen\"") {
//!     Err(FilterError::MissingClosingBracket { closing, .. }) => assert_eq!(closing, ')'),
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod ast;
pub mod error;
mod parser;
pub mod selector;

// Re-export main types
pub use ast::*;
pub use error::*;
pub use parser::{parse_filter, FilterParser, ParserOptions, DEFAULT_MAX_DEPTH};
pub use selector::ResourceSelector;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
