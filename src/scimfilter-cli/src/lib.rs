//! scimfilter-cli library
//!
//! Provides the argument definitions, configuration layer and output
//! formatting behind the `scimfilter` binary.

pub mod cli;
pub mod config;
pub mod output;

pub use config::Config;
pub use output::OutputWriter;
