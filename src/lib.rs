pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod visuals;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::FirePipeline;
pub use config::{cli::LocalStorage, HazardsConfig};
pub use crate::core::{etl::EtlEngine, loader::FirePointDataLoader};
pub use domain::fire_point::FirePoint;
pub use utils::error::{HazardsError, Result};
