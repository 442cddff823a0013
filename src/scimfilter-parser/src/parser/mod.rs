//! Parser implementation for SCIM filter expressions
//!
//! Parsing runs in two stages: the tokenizer scans the filter into typed
//! tokens (recursing into bracketed groups), and the reducer folds the token
//! stream into the statement tree.

use log::debug;

use crate::ast::{Filter, FilterNode};
use crate::error::{FilterError, Result};

mod reducer;
mod tokenizer;

use reducer::Reducer;

/// Default limit on group nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest group nesting accepted; deeper filters fail with
    /// [`FilterError::TooDeep`]
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Main parser for filter expressions
#[derive(Debug, Clone, Default)]
pub struct FilterParser {
    options: ParserOptions,
}

impl FilterParser {
    /// Create a new parser instance with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Options this parser was created with
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a filter string into its statement tree
    ///
    /// Empty or whitespace-only input yields an empty [`Filter`].
    pub fn parse(&self, input: &str) -> Result<Filter> {
        let statements = parse_statements(input, 0, 0, &self.options)?;
        debug!(
            "parsed filter {:?} into {} statement(s)",
            input,
            statements.len()
        );
        Ok(Filter::new(statements))
    }
}

/// Parse a filter string with default options
pub fn parse_filter(input: &str) -> Result<Filter> {
    FilterParser::new().parse(input)
}

/// Tokenize and reduce `input`, found at `offset` and nesting `depth`
pub(crate) fn parse_statements(
    input: &str,
    offset: usize,
    depth: usize,
    options: &ParserOptions,
) -> Result<Vec<FilterNode>> {
    if depth > options.max_depth {
        return Err(FilterError::TooDeep {
            max_depth: options.max_depth,
        });
    }

    let tokens = tokenizer::tokenize(input, offset, depth, options)?;
    Reducer::new(&tokens, depth, options.max_depth).reduce()
}
