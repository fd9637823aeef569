use crate::core::date::Hl7DateParser;
use crate::core::extractor::{DialectExtractor, CCDA_PROBLEMS_SECTION, VA_C32_PROBLEMS_SECTION};
use crate::domain::model::{EntryPolicy, ProblemRecord, ProblemsReport};
use crate::domain::ports::{DateParser, DocumentNode};
use crate::utils::error::{ProblemsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Ccda,
    VaC32,
    Json,
}

impl Dialect {
    /// Template id of the problems section; `None` for JSON input.
    pub fn section_template(&self) -> Option<&'static str> {
        match self {
            Self::Ccda => Some(CCDA_PROBLEMS_SECTION),
            Self::VaC32 => Some(VA_C32_PROBLEMS_SECTION),
            Self::Json => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ccda => "ccda",
            Self::VaC32 => "va_c32",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ProblemsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ccda" => Ok(Self::Ccda),
            "va_c32" => Ok(Self::VaC32),
            "json" => Ok(Self::Json),
            other => Err(ProblemsError::UnsupportedDialect {
                tag: other.to_string(),
            }),
        }
    }
}

/// Input to [`ProblemsProcessor::process`].
#[derive(Debug, Clone, Copy)]
pub enum Source<'a, N> {
    Document(N),
    Json(&'a serde_json::Value),
}

/// Entry point: picks the extractor for a document type and reshapes its
/// output into [`ProblemRecord`]s. Holds no per-call state.
#[derive(Debug, Clone, Default)]
pub struct ProblemsProcessor<D = Hl7DateParser> {
    date_parser: D,
    policy: EntryPolicy,
}

impl ProblemsProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: DateParser> ProblemsProcessor<D> {
    pub fn with_date_parser(date_parser: D) -> Self {
        Self {
            date_parser,
            policy: EntryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn process<N: DocumentNode>(
        &self,
        source: Source<'_, N>,
        dialect: Dialect,
    ) -> Result<Vec<ProblemRecord>> {
        Ok(self.process_report(source, dialect)?.problems)
    }

    /// Same as [`process`](Self::process) with the type given as a string tag.
    pub fn process_tag<N: DocumentNode>(
        &self,
        source: Source<'_, N>,
        tag: &str,
    ) -> Result<Vec<ProblemRecord>> {
        self.process(source, tag.parse()?)
    }

    pub fn process_report<N: DocumentNode>(
        &self,
        source: Source<'_, N>,
        dialect: Dialect,
    ) -> Result<ProblemsReport> {
        let section_template = match dialect.section_template() {
            Some(template) => template,
            None => return Ok(self.process_json(source)),
        };

        let root = match source {
            Source::Document(root) => root,
            Source::Json(_) => {
                return Err(ProblemsError::SourceMismatch {
                    dialect: dialect.to_string(),
                    message: "expected a document tree, got JSON".to_string(),
                });
            }
        };

        let extraction = DialectExtractor::new(section_template, &self.date_parser)
            .with_policy(self.policy)
            .extract(&root)?;

        tracing::debug!(
            "Extracted {} problems ({} skipped) from {} document",
            extraction.records.len(),
            extraction.warnings.len(),
            dialect
        );

        Ok(ProblemsReport {
            problems: extraction
                .records
                .into_iter()
                .map(ProblemRecord::from)
                .collect(),
            warnings: extraction.warnings,
        })
    }

    // JSON input is accepted but not parsed yet: always an empty result.
    fn process_json<N>(&self, source: Source<'_, N>) -> ProblemsReport {
        if let Source::Document(_) = source {
            tracing::debug!("Document tree passed with json type, returning no problems");
        }
        ProblemsReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::xml::{XmlDocument, XmlElement};

    #[test]
    fn test_dialect_tags() {
        assert_eq!("ccda".parse::<Dialect>().unwrap(), Dialect::Ccda);
        assert_eq!("va_c32".parse::<Dialect>().unwrap(), Dialect::VaC32);
        assert_eq!("json".parse::<Dialect>().unwrap(), Dialect::Json);
        assert_eq!(Dialect::VaC32.to_string(), "va_c32");
        assert!(matches!(
            "CCDA".parse::<Dialect>(),
            Err(ProblemsError::UnsupportedDialect { .. })
        ));
    }

    #[test]
    fn test_json_is_empty() {
        let value = serde_json::json!({"problems": [{"name": "Asthma"}]});
        let processor = ProblemsProcessor::new();
        let problems = processor
            .process(Source::<XmlElement>::Json(&value), Dialect::Json)
            .unwrap();
        assert!(problems.is_empty());
    }

    #[test]
    fn test_json_source_with_tree_dialect_is_rejected() {
        let value = serde_json::json!([]);
        let processor = ProblemsProcessor::new();
        let err = processor
            .process(Source::<XmlElement>::Json(&value), Dialect::Ccda)
            .unwrap_err();
        assert!(matches!(err, ProblemsError::SourceMismatch { .. }));
    }

    #[test]
    fn test_document_with_json_dialect_is_empty() {
        let doc = XmlDocument::parse(
            r#"<ClinicalDocument><templateId root="2.16.840.1.113883.10.20.22.1.1"/></ClinicalDocument>"#,
        )
        .unwrap();
        let processor = ProblemsProcessor::new().with_policy(EntryPolicy::FailFast);
        let report = processor
            .process_report(Source::Document(doc.root()), Dialect::Json)
            .unwrap();
        assert!(report.problems.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_tag_fails() {
        let doc = XmlDocument::parse("<ClinicalDocument/>").unwrap();
        let processor = ProblemsProcessor::new();
        let err = processor
            .process_tag(Source::Document(doc.root()), "hl7v2")
            .unwrap_err();
        match err {
            ProblemsError::UnsupportedDialect { tag } => assert_eq!(tag, "hl7v2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_document_without_section_is_empty() {
        let doc = XmlDocument::parse("<ClinicalDocument/>").unwrap();
        let processor = ProblemsProcessor::new();
        let problems = processor
            .process(Source::Document(doc.root()), Dialect::VaC32)
            .unwrap();
        assert!(problems.is_empty());
    }
}
