pub mod fire_pipeline;

pub use fire_pipeline::FirePipeline;
