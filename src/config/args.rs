use crate::config::toml_config::{CompressionConfig, HazardsConfig};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

const DEFAULT_ARCHIVE_NAME: &str = "hazards_output.zip";

#[derive(Debug, Clone, Parser)]
#[command(name = "hazards")]
#[command(about = "Explore Canadian wildfire hazards from the National Fire Database")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log CPU and memory usage per pipeline phase
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Log output format
    #[arg(long, global = true, value_parser = ["compact", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download, validate and render the fire map
    Run(RunArgs),
    /// Download and validate only, then print the validation report
    Validate(ValidateArgs),
    /// Print the first records of the validated dataset
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// HTTP(S) URL or local path of the NFDB archive or delimited file
    #[arg(long)]
    pub source: Option<String>,

    /// Ignore the download cache
    #[arg(long)]
    pub force_reload: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Show fires reported on or after this date (YYYY-MM-DD), or `all`
    #[arg(long)]
    pub since: Option<String>,

    #[arg(long)]
    pub color_by_year: bool,

    /// Use a fixed point radius instead of scaling by burned area
    #[arg(long)]
    pub no_size_by_area: bool,

    /// Initial map view: canada or quebec
    #[arg(long)]
    pub view: Option<String>,

    /// Skip model validation (unconvertible rows are still dropped)
    #[arg(long)]
    pub no_validate: bool,

    /// Bundle every output into a single ZIP archive
    #[arg(long)]
    pub zip: bool,

    /// Show what would be processed without executing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Allowed fraction of non-conforming rows
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Exit with an error when the data is unhealthy
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of records to print
    #[arg(long)]
    pub rows: Option<usize>,
}

impl CliConfig {
    /// Loads the configuration file (or defaults) and applies command line
    /// overrides on top of it.
    pub fn resolve(&self) -> Result<HazardsConfig> {
        let mut config = match &self.config {
            Some(path) => HazardsConfig::from_file(path)?,
            None => HazardsConfig::default(),
        };

        if self.monitor {
            config.monitoring.enabled = true;
        }
        if let Some(format) = &self.log_format {
            config.monitoring.log_format = Some(format.clone());
        }

        match &self.command {
            Command::Run(args) => args.apply(&mut config),
            Command::Validate(args) => args.apply(&mut config),
            Command::Preview(args) => args.apply(&mut config),
        }

        Ok(config)
    }

    pub fn force_reload(&self) -> bool {
        match &self.command {
            Command::Run(args) => args.source.force_reload,
            Command::Validate(args) => args.source.force_reload,
            Command::Preview(args) => args.source.force_reload,
        }
    }
}

impl SourceArgs {
    fn apply(&self, config: &mut HazardsConfig) {
        if let Some(source) = &self.source {
            if source.starts_with("http://") || source.starts_with("https://") {
                config.source.url = source.clone();
                config.source.path = None;
            } else {
                config.source.path = Some(source.clone());
            }
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut HazardsConfig) {
        self.source.apply(config);

        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if let Some(since) = &self.since {
            config.map.since = Some(since.clone());
        }
        if self.color_by_year {
            config.map.color_by_year = true;
        }
        if self.no_size_by_area {
            config.map.size_by_area = false;
        }
        if let Some(view) = &self.view {
            config.map.view = view.clone();
        }
        if self.no_validate {
            config.validation.enabled = false;
        }
        if self.zip {
            let filename = config
                .load
                .compression
                .as_ref()
                .map(|c| c.filename.clone())
                .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());
            config.load.compression = Some(CompressionConfig {
                enabled: true,
                filename,
            });
        }
    }
}

impl ValidateArgs {
    fn apply(&self, config: &mut HazardsConfig) {
        self.source.apply(config);

        if let Some(tolerance) = self.tolerance {
            config.validation.tolerance = tolerance;
        }
        if self.strict {
            config.validation.fail_on_unhealthy = true;
        }
        config.validation.enabled = true;
    }
}

impl PreviewArgs {
    fn apply(&self, config: &mut HazardsConfig) {
        self.source.apply(config);

        if let Some(rows) = self.rows {
            config.map.preview_rows = rows;
        }
    }
}
