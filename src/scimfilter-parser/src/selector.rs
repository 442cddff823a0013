//! Resource selection input
//!
//! Resource queries arrive either as a configuration object with an
//! optional `filter` string, or as a bare resource identifier. An identifier
//! is rewritten into an equality filter on `id` before parsing.

use serde::{Deserialize, Serialize};

use crate::ast::Filter;
use crate::error::Result;
use crate::parser::FilterParser;

/// How a caller selects resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceSelector {
    /// A single resource by identifier
    Id(String),

    /// Query configuration
    Query {
        /// Filter expression, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
    },
}

impl ResourceSelector {
    /// Selector for a filter expression
    pub fn filter(filter: impl Into<String>) -> Self {
        ResourceSelector::Query {
            filter: Some(filter.into()),
        }
    }

    /// Filter text this selector stands for, if any
    pub fn filter_text(&self) -> Option<String> {
        match self {
            ResourceSelector::Id(id) => Some(format!("id eq \"{}\"", escape(id))),
            ResourceSelector::Query { filter } => filter.clone(),
        }
    }

    /// Parse the selector's filter
    pub fn resolve(&self, parser: &FilterParser) -> Result<Option<Filter>> {
        self.filter_text()
            .map(|text| parser.parse(&text))
            .transpose()
    }
}

impl Default for ResourceSelector {
    fn default() -> Self {
        ResourceSelector::Query { filter: None }
    }
}

impl From<&str> for ResourceSelector {
    fn from(id: &str) -> Self {
        ResourceSelector::Id(id.to_string())
    }
}

impl From<String> for ResourceSelector {
    fn from(id: String) -> Self {
        ResourceSelector::Id(id)
    }
}

/// Backslash-escape quotes and backslashes so the id stays one string token
fn escape(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for ch in id.chars() {
        if ch == '"' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
