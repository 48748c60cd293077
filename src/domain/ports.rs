use crate::domain::model::{Record, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Where and how fire records are fetched.
pub trait ConfigProvider: Send + Sync {
    /// HTTP(S) URL or local path of the archive or delimited file.
    fn source(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Extension of the archive member holding the records.
    fn member_extension(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn request_timeout(&self) -> Option<Duration>;
    /// `None` disables the download cache.
    fn cache_dir(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
