//! scimfilter: SCIM filter expressions for Rust
//!
//! This crate re-exports [`scimfilter_parser`], which turns filter strings
//! such as `userName eq "bjensen" and not (title pr)` into a nested
//! statement tree. The `scimfilter` command-line tool lives in the
//! `scimfilter-cli` workspace member.
//!
//! ```rust
//! let filter = scimfilter::parse_filter(r#"emails[type eq "work"] or title pr"#)?;
//! assert_eq!(filter.len(), 2);
//! assert_eq!(filter.to_string(), r#"emails[type eq "work"] or title pr"#);
//! # Ok::<(), scimfilter::FilterError>(())
//! ```

pub use scimfilter_parser::*;
