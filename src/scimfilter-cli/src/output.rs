//! Output formatting for the scimfilter CLI
//!
//! Parsed filters print as JSON (pretty or compact) or as canonical filter
//! text. Parse failures print as the SCIM error response body.

use crate::config::OutputConfig;
use anyhow::{Context, Result};
use scimfilter_parser::{Filter, FilterError};
use std::io::Write;

/// Output writer for parsed filters
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render a filter according to the output settings
    pub fn render(&self, filter: &Filter) -> Result<String> {
        if self.config.canonical {
            return Ok(filter.to_string());
        }

        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(filter)
        } else {
            serde_json::to_string(filter)
        };
        rendered.context("Failed to serialize filter")
    }

    /// Write a filter to stdout
    pub fn write_to_stdout(&self, filter: &Filter) -> Result<()> {
        self.write(filter, &mut std::io::stdout().lock())
    }

    /// Write a filter, followed by a newline
    pub fn write<W: Write>(&self, filter: &Filter, writer: &mut W) -> Result<()> {
        let rendered = self.render(filter)?;
        writeln!(writer, "{rendered}").context("Failed to write output")
    }
}

/// SCIM error response body for a parse failure
pub fn error_body(error: &FilterError) -> String {
    serde_json::to_string(&error.to_response()).unwrap_or_else(|_| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scimfilter_parser::parse_filter;

    fn writer(pretty: bool, canonical: bool) -> OutputWriter {
        OutputWriter::new(OutputConfig { pretty, canonical })
    }

    #[test]
    fn test_render_compact() {
        let filter = parse_filter("a eq 1 and b pr").unwrap();
        assert_eq!(
            writer(false, false).render(&filter).unwrap(),
            r#"[{"a":["eq",1],"b":["pr"]}]"#
        );
    }

    #[test]
    fn test_render_pretty() {
        let filter = parse_filter("title pr").unwrap();
        assert_eq!(
            writer(true, false).render(&filter).unwrap(),
            "[\n  {\n    \"title\": [\n      \"pr\"\n    ]\n  }\n]"
        );
    }

    #[test]
    fn test_render_canonical() {
        let filter = parse_filter("A EQ \"x\" AND (b PR OR c LT 2)").unwrap();
        assert_eq!(
            writer(true, true).render(&filter).unwrap(),
            "A eq \"x\" and (b pr or c lt 2)"
        );
    }

    #[test]
    fn test_write_appends_newline() {
        let filter = parse_filter("").unwrap();
        let mut buffer = Vec::new();
        writer(false, false).write(&filter, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "[]\n");
    }

    #[test]
    fn test_error_body() {
        let error = parse_filter("userName eq").unwrap_err();
        let body: serde_json::Value = serde_json::from_str(&error_body(&error)).unwrap();

        assert_eq!(
            body["schemas"][0],
            "urn:ietf:params:scim:api:messages:2.0:Error"
        );
        assert_eq!(body["status"], "400");
        assert_eq!(body["scimType"], "invalidFilter");
        assert_eq!(
            body["detail"],
            "Expected a comparison value after 'userName eq'"
        );
    }
}
