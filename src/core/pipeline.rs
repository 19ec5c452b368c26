use crate::adapters::ids::RandomIds;
use crate::core::calculator::SplitCalculator;
use crate::core::export::{math_table_csv, split_json};
use crate::core::normalizer::{Normalizer, RawBill};
use crate::core::{ConfigProvider, Extractor, IdentifierSource, Pipeline, Storage};
use crate::domain::model::{Extraction, SplitReport};
use crate::utils::error::{Result, SplitError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const OUTPUT_ARCHIVE: &str = "split_output.zip";
pub const INTERACTION_LOG: &str = "llm_logs.jsonl";

pub struct SplitPipeline<E: Extractor, S: Storage, C: ConfigProvider> {
    extractor: E,
    storage: S,
    config: C,
    ids: Box<dyn IdentifierSource>,
}

impl<E: Extractor, S: Storage, C: ConfigProvider> SplitPipeline<E, S, C> {
    pub fn new(extractor: E, storage: S, config: C) -> Self {
        Self {
            extractor,
            storage,
            config,
            ids: Box::new(RandomIds),
        }
    }

    pub fn with_ids(mut self, ids: impl IdentifierSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn append_interaction_log(&self, extraction: &Extraction) -> Result<()> {
        let mut log = match self.storage.read_file(INTERACTION_LOG).await {
            Ok(existing) => existing,
            Err(SplitError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        serde_json::to_writer(&mut log, extraction)?;
        log.push(b'\n');
        self.storage.write_file(INTERACTION_LOG, &log).await
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }
}

#[async_trait::async_trait]
impl<E: Extractor, S: Storage, C: ConfigProvider> Pipeline for SplitPipeline<E, S, C> {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        let extraction = self.extractor.extract(text).await?;

        tracing::info!(
            model = %extraction.model,
            latency_ms = extraction.latency_ms,
            "Extraction finished"
        );
        tracing::debug!("Extraction output: {}", extraction.output);

        // 互動紀錄只供觀察，寫入失敗不影響分帳
        if let Err(e) = self.append_interaction_log(&extraction).await {
            tracing::warn!("Could not append interaction log: {}", e);
        }

        Ok(extraction)
    }

    async fn transform(&self, extraction: &Extraction) -> Result<SplitReport> {
        let raw = RawBill::parse(&extraction.output);
        let normalized = Normalizer::new(self.ids.as_ref(), self.config.unmatched_names())
            .normalize(&raw);

        let calculator = SplitCalculator::new(self.config.rounding());
        let outcome = calculator.calculate(&normalized.state);

        match &outcome {
            Ok(breakdown) => tracing::info!(
                "Split {} items between {} people",
                normalized.state.items.len(),
                breakdown.output.len()
            ),
            Err(e) => tracing::warn!("Bill needs correcting: {}", e),
        }

        Ok(SplitReport {
            state: normalized.state,
            notes: normalized.notes,
            outcome,
        })
    }

    async fn load(&self, report: &SplitReport) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), OUTPUT_ARCHIVE);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            if self.wants("json") {
                zip.start_file::<_, ()>("split.json", FileOptions::default())?;
                zip.write_all(split_json(report)?.as_bytes())?;
            }

            if let Some(breakdown) = report.breakdown() {
                if self.wants("csv") {
                    zip.start_file::<_, ()>("math.csv", FileOptions::default())?;
                    zip.write_all(math_table_csv(breakdown, b',')?.as_bytes())?;
                }
                if self.wants("tsv") {
                    zip.start_file::<_, ()>("math.tsv", FileOptions::default())?;
                    zip.write_all(math_table_csv(breakdown, b'\t')?.as_bytes())?;
                }
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(OUTPUT_ARCHIVE, &zip_data).await?;

        Ok(output_path)
    }
}
