use crate::core::Pipeline;
use crate::domain::model::EntryWarning;
use crate::utils::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub problem_count: usize,
    pub warnings: Vec<EntryWarning>,
    pub written: Vec<String>,
}

pub struct ExtractionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ExtractionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting problem extraction");

        let report = self.pipeline.extract()?;
        tracing::info!(
            "Extracted {} problems, skipped {} entries",
            report.problems.len(),
            report.warnings.len()
        );
        let warnings = report.warnings.clone();

        let transformed = self.pipeline.transform(report)?;
        let problem_count = transformed.problems.len();

        let written = self.pipeline.load(transformed)?;
        for path in &written {
            tracing::info!("Output saved to: {}", path);
        }

        Ok(RunSummary {
            problem_count,
            warnings,
            written,
        })
    }
}
