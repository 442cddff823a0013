//! Configuration management for scimfilter
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! first configuration file found in the standard locations, an explicit
//! `--config` file, `SCIMFILTER_*` environment variables and finally the
//! command line.

use crate::cli::CliConfig;
use anyhow::{anyhow, bail, Context, Result};
use scimfilter_parser::{ParserOptions, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 4] = [
    "scimfilter.toml",
    ".scimfilter.toml",
    "scimfilter.yaml",
    ".scimfilter.yaml",
];

/// Main configuration structure for the scimfilter binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser limits
    pub parser: ParserConfig,
    /// Output formatting
    pub output: OutputConfig,
    /// Debug and diagnostic configuration
    pub debug: DebugConfig,
}

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest group nesting to accept
    pub max_depth: usize,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Print the canonical filter text instead of JSON
    pub canonical: bool,
}

/// Debug and diagnostic configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Verbosity level
    pub verbosity: u8,
}

/// Settings a single config file sets; absent keys leave earlier layers alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    parser: ParserLayer,
    output: OutputLayer,
    debug: DebugLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParserLayer {
    max_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputLayer {
    pretty: Option<bool>,
    canonical: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DebugLayer {
    verbosity: Option<u8>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            canonical: false,
        }
    }
}

impl Config {
    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Load configuration from every source except the command line
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file(None) {
            config.merge_file(&config_path)?;
        }

        if let Some(config_path) = explicit {
            config.merge_file(config_path)?;
        }

        config.merge_env()?;

        Ok(config)
    }

    /// Find configuration file in standard locations
    pub(crate) fn find_config_file(current_dir: Option<&Path>) -> Option<PathBuf> {
        let current_dir = match current_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let user_dir = dirs::config_dir().map(|dir| dir.join("scimfilter"));

        std::iter::once(current_dir)
            .chain(user_dir)
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Merge configuration from file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let layer: ConfigLayer = match extension {
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML config {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML config {}", path.display()))?,
            _ => bail!("Unsupported config file format: {}", path.display()),
        };

        self.merge(layer);
        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with_reader(|key| std::env::var(key).ok())
    }

    /// Merge configuration from environment variables with custom reader
    fn merge_env_with_reader<F>(&mut self, env_reader: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env_reader("SCIMFILTER_MAX_DEPTH") {
            self.parser.max_depth = val
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid SCIMFILTER_MAX_DEPTH: {val}"))?;
        }

        if let Some(val) = env_reader("SCIMFILTER_PRETTY") {
            self.output.pretty = val != "0" && val.to_lowercase() != "false";
        }

        if let Some(val) = env_reader("SCIMFILTER_VERBOSITY") {
            self.debug.verbosity = val
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid SCIMFILTER_VERBOSITY: {val}"))?;
        }

        Ok(())
    }

    /// Merge a file layer into this config
    ///
    /// Every key the file sets overrides, even when it holds the default.
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(max_depth) = layer.parser.max_depth {
            self.parser.max_depth = max_depth;
        }
        if let Some(pretty) = layer.output.pretty {
            self.output.pretty = pretty;
        }
        if let Some(canonical) = layer.output.canonical {
            self.output.canonical = canonical;
        }
        if let Some(verbosity) = layer.debug.verbosity {
            self.debug.verbosity = verbosity;
        }
    }

    /// Apply CLI configuration overrides
    pub fn apply_cli(&mut self, cli_config: &CliConfig) {
        if let Some(max_depth) = cli_config.max_depth {
            self.parser.max_depth = max_depth;
        }
        if cli_config.compact {
            self.output.pretty = false;
        }
        if cli_config.canonical {
            self.output.canonical = true;
        }
        if cli_config.verbose > 0 {
            self.debug.verbosity = cli_config.verbose;
        }
    }

    /// Reject settings the parser cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.parser.max_depth == 0 {
            bail!("Max depth must be greater than 0");
        }
        Ok(())
    }

    /// Parser options for these settings
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            max_depth: self.parser.max_depth,
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml");

        let content = match extension {
            "toml" => toml::to_string_pretty(self).context("Failed to serialize config")?,
            "yaml" | "yml" => serde_yaml::to_string(self).context("Failed to serialize config")?,
            _ => bail!("Unsupported config file format: {}", path.display()),
        };

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

/// Create a default config file template
pub fn create_default_config_file(path: &Path) -> Result<()> {
    Config::default().save(path)
}
