pub mod page_config;
pub mod pipelines;
