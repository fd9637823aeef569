use crate::core::processor::{Dialect, ProblemsProcessor};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::document::detect::{detect, parse_bytes};
use crate::domain::model::{ProblemRecord, ProblemRow, ProblemsReport, TransformResult};
use crate::utils::error::{ProblemsError, Result};
use std::path::Path;

pub const JSON_FILENAME: &str = "problems.json";
pub const CSV_FILENAME: &str = "problems.csv";
pub const TSV_FILENAME: &str = "problems.tsv";

/// Reads one document, extracts its problems and writes them out in the
/// configured formats.
pub struct ProblemsPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    processor: ProblemsProcessor,
}

impl<S: Storage, C: ConfigProvider> ProblemsPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let processor = ProblemsProcessor::new().with_policy(config.entry_policy());
        Self {
            storage,
            config,
            processor,
        }
    }

    fn resolve_dialect(&self, detected: Option<Dialect>) -> Result<Dialect> {
        if let Some(tag) = self.config.dialect() {
            let dialect: Dialect = tag.parse()?;
            if detected.is_some_and(|d| d != dialect) {
                tracing::warn!(
                    "Document looks like {:?} but {} was requested",
                    detected,
                    dialect
                );
            }
            return Ok(dialect);
        }

        detected.ok_or_else(|| ProblemsError::UnrecognizedDocument {
            message: format!(
                "{} has no C-CDA or C32 document template id",
                self.config.input_path()
            ),
        })
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ProblemsPipeline<S, C> {
    fn extract(&self) -> Result<ProblemsReport> {
        tracing::debug!("Reading document from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path())?;
        let parsed = parse_bytes(&bytes)?;

        let dialect = self.resolve_dialect(detect(&parsed))?;
        tracing::debug!("Processing document as {}", dialect);

        self.processor.process_report(parsed.as_source(), dialect)
    }

    fn transform(&self, report: ProblemsReport) -> Result<TransformResult> {
        let mut result = TransformResult::default();

        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => {
                    result.json_output = Some(if self.config.pretty_json() {
                        serde_json::to_string_pretty(&report.problems)?
                    } else {
                        serde_json::to_string(&report.problems)?
                    });
                }
                "csv" => result.csv_output = Some(render_delimited(&report.problems, b',')?),
                "tsv" => result.tsv_output = Some(render_delimited(&report.problems, b'\t')?),
                other => {
                    return Err(ProblemsError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format. Valid formats: json, csv, tsv".to_string(),
                    });
                }
            }
        }

        result.problems = report.problems;
        Ok(result)
    }

    fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let outputs = [
            (JSON_FILENAME, result.json_output),
            (CSV_FILENAME, result.csv_output),
            (TSV_FILENAME, result.tsv_output),
        ];

        let mut written = Vec::new();
        for (filename, content) in outputs {
            let Some(content) = content else { continue };
            let path = Path::new(self.config.output_path())
                .join(filename)
                .to_string_lossy()
                .into_owned();

            tracing::debug!("Writing {} ({} bytes)", path, content.len());
            self.storage.write_file(&path, content.as_bytes())?;
            written.push(path);
        }

        Ok(written)
    }
}

fn render_delimited(problems: &[ProblemRecord], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if problems.is_empty() {
        writer.write_record([
            "from",
            "to",
            "name",
            "status",
            "age",
            "code",
            "code_system",
        ])?;
    }
    for problem in problems {
        writer.serialize(ProblemRow::from(problem))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
