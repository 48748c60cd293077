pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod args;

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command, PreviewArgs, RunArgs, SourceArgs, ValidateArgs};
pub use toml_config::HazardsConfig;
