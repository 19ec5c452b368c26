use crate::core::rounding::RoundingMode;
use crate::core::normalizer::UnmatchedNamePolicy;
use crate::domain::model::{Extraction, SplitReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Hands out identifiers that are unique within one bill.
pub trait IdentifierSource: Send + Sync {
    fn next_id(&self) -> String;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn extractor_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn rounding(&self) -> RoundingMode;
    fn unmatched_names(&self) -> UnmatchedNamePolicy;
}

/// Turns free text into the JSON document the normalizer understands.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction>;
    async fn transform(&self, extraction: &Extraction) -> Result<SplitReport>;
    async fn load(&self, report: &SplitReport) -> Result<String>;
}
