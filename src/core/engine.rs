use crate::core::Pipeline;
use crate::domain::model::SplitReport;
use crate::utils::error::Result;

#[derive(Debug)]
pub struct SplitRun {
    pub report: SplitReport,
    pub output_path: String,
}

pub struct SplitEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SplitEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self, text: &str) -> Result<SplitRun> {
        tracing::info!("Starting split process...");

        tracing::info!("Extracting bill from {} characters of text", text.chars().count());
        let extraction = self.pipeline.extract(text).await?;

        let report = self.pipeline.transform(&extraction).await?;
        tracing::info!(
            "Normalized {} participants and {} items",
            report.state.participants.len(),
            report.state.items.len()
        );

        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(SplitRun {
            report,
            output_path,
        })
    }
}
