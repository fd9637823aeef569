use crate::core::processor::{Dialect, Source};
use crate::document::xml::{XmlDocument, XmlElement};
use crate::domain::ports::DocumentNode;
use crate::utils::error::Result;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const C32_DOCUMENT_TEMPLATE: &str = "2.16.840.1.113883.3.88.11.32.1";
pub const CCDA_DOCUMENT_TEMPLATE: &str = "2.16.840.1.113883.10.20.22.1.1";

/// A document read from text: either an XML tree or a JSON value.
#[derive(Debug, Clone)]
pub enum ParsedSource {
    Xml(XmlDocument),
    Json(serde_json::Value),
}

impl ParsedSource {
    pub fn as_source(&self) -> Source<'_, XmlElement<'_>> {
        match self {
            Self::Xml(doc) => Source::Document(doc.root()),
            Self::Json(value) => Source::Json(value),
        }
    }
}

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Parse raw input. XML is recognised by its declaration or a
/// `ClinicalDocument` root (the declaration is optional); anything else has
/// to be JSON.
pub fn parse_source(text: &str) -> Result<ParsedSource> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let trimmed = text.trim_start();

    if trimmed.starts_with("<?xml") || trimmed.starts_with("<ClinicalDocument") {
        return Ok(ParsedSource::Xml(XmlDocument::parse(text)?));
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(ParsedSource::Json(value)),
        Err(e) => {
            tracing::error!(
                "Cannot parse this input. Only valid XML (for parsing) or JSON is accepted: {}",
                e
            );
            Err(e.into())
        }
    }
}

pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedSource> {
    let text = String::from_utf8_lossy(strip_bom(bytes));
    parse_source(&text)
}

/// Work out the document type from its header template ids.
pub fn detect(source: &ParsedSource) -> Option<Dialect> {
    match source {
        ParsedSource::Json(_) => Some(Dialect::Json),
        ParsedSource::Xml(doc) => {
            let root = doc.root();
            if root.template(C32_DOCUMENT_TEMPLATE).is_some() {
                Some(Dialect::VaC32)
            } else if root.template(CCDA_DOCUMENT_TEMPLATE).is_some() {
                Some(Dialect::Ccda)
            } else {
                tracing::debug!("No known document template id found");
                None
            }
        }
    }
}
