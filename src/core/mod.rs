pub mod etl;
pub mod loader;
pub mod selection;
pub mod validation;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
