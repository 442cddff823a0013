//! Error types for the filter parser
//!
//! Every failure is an *invalid filter* error in SCIM terms: the request is
//! answered with HTTP status 400 and the `invalidFilter` error type. The
//! variants only refine the human-readable detail.

use serde::{Deserialize, Serialize};

/// HTTP status reported for every filter error
pub const INVALID_FILTER_STATUS: u16 = 400;

/// SCIM error type reported for every filter error
pub const INVALID_FILTER_TYPE: &str = "invalidFilter";

/// Schema URN of a SCIM error response body
pub const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// Errors that can occur while parsing a filter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Input that no token pattern matches
    #[error("Unexpected token '{found}' in filter at position {position}")]
    UnexpectedToken {
        /// Offending text
        found: String,
        /// Byte position in the filter
        position: usize,
    },

    /// Group opened but never closed with the matching bracket
    #[error("Missing closing '{closing}' for '{opening}' opened at position {position}")]
    MissingClosingBracket {
        /// The opening bracket
        opening: char,
        /// The bracket that was expected
        closing: char,
        /// Byte position of the opening bracket
        position: usize,
    },

    /// Quoted string without its closing quote
    #[error("Unterminated string literal starting at position {position}")]
    UnterminatedString {
        /// Byte position of the opening quote
        position: usize,
    },

    /// Number literal outside the representable range
    #[error("Invalid number '{number}' at position {position}")]
    InvalidNumber {
        /// The number as written
        number: String,
        /// Byte position in the filter
        position: usize,
    },

    /// Comparator other than `pr` at the end of the filter
    #[error("Expected a comparison value after '{attribute} {comparator}'")]
    MissingValue {
        /// Attribute being compared
        attribute: String,
        /// Comparator keyword
        comparator: String,
    },

    /// Comparator followed by something other than a literal
    #[error("Expected a comparison value after '{attribute} {comparator}', found '{found}'")]
    InvalidValue {
        /// Attribute being compared
        attribute: String,
        /// Comparator keyword
        comparator: String,
        /// Offending text
        found: String,
    },

    /// Attribute path followed by neither a comparator nor a group
    #[error("Expected a comparator or attribute filter after '{attribute}'")]
    MissingComparator {
        /// Attribute path
        attribute: String,
    },

    /// Logical operator at the end of the filter
    #[error("Expected an expression after '{operator}'")]
    MissingOperand {
        /// Operator keyword
        operator: String,
    },

    /// `()` or `[]` with nothing inside
    #[error("Empty group at position {position}")]
    EmptyGroup {
        /// Byte position of the opening bracket
        position: usize,
    },

    /// Groups or `not` chains nested deeper than the parser allows
    #[error("Filter is nested deeper than {max_depth} levels")]
    TooDeep {
        /// Configured nesting limit
        max_depth: usize,
    },
}

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    /// HTTP status code for the error
    pub fn status(&self) -> u16 {
        INVALID_FILTER_STATUS
    }

    /// SCIM error type keyword for the error
    pub fn scim_type(&self) -> &'static str {
        INVALID_FILTER_TYPE
    }

    /// Build the SCIM error response body for the error
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            schemas: vec![ERROR_SCHEMA.to_string()],
            status: self.status().to_string(),
            scim_type: Some(self.scim_type().to_string()),
            detail: Some(self.to_string()),
        }
    }
}

/// SCIM error response body (RFC 7644, section 3.12)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always the SCIM error schema URN
    pub schemas: Vec<String>,
    /// HTTP status code, as a string
    pub status: String,
    /// SCIM error type keyword
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<FilterError> for ErrorResponse {
    fn from(err: FilterError) -> Self {
        err.to_response()
    }
}
