use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProblemsError {
    #[error("XML parsing failed: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttrError(#[from] quick_xml::events::attributes::AttrError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unsupported document type: {tag}")]
    UnsupportedDialect { tag: String },

    #[error("Source does not match document type {dialect}: {message}")]
    SourceMismatch { dialect: String, message: String },

    #[error("Unrecognized document: {message}")]
    UnrecognizedDocument { message: String },

    #[error("Entry {index} is missing {missing}")]
    IncompleteEntry { index: usize, missing: String },

    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    #[error("Configuration error: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Document,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProblemsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::XmlError(_)
            | Self::XmlAttrError(_)
            | Self::SerializationError(_)
            | Self::UnrecognizedDocument { .. }
            | Self::MalformedDocument { .. } => ErrorCategory::Input,
            Self::UnsupportedDialect { .. }
            | Self::SourceMismatch { .. }
            | Self::IncompleteEntry { .. } => ErrorCategory::Document,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::IncompleteEntry { .. } => ErrorSeverity::Medium,
            Self::UnsupportedDialect { .. } | Self::UnrecognizedDocument { .. } => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::XmlError(_) | Self::XmlAttrError(_) | Self::MalformedDocument { .. } => {
                format!("The input document could not be read as XML: {}", self)
            }
            Self::SerializationError(_) => {
                format!("The input could not be read as XML or JSON: {}", self)
            }
            Self::UnsupportedDialect { tag } => {
                format!("'{}' is not a supported document type", tag)
            }
            Self::UnrecognizedDocument { .. } => {
                "The document is neither a C-CDA nor a C32 document".to_string()
            }
            Self::IncompleteEntry { index, missing } => {
                format!("Problem entry #{} has no {}", index + 1, missing)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Run the document through an XML or JSON validator and check for a truncated file"
            }
            ErrorCategory::Document => match self {
                Self::IncompleteEntry { .. } => {
                    "Drop --strict to skip incomplete entries instead of failing"
                }
                _ => "Pass --dialect with one of: ccda, va_c32, json",
            },
            ErrorCategory::Configuration => "Check the command-line flags and the config file",
            ErrorCategory::Output => "Check that the output path exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProblemsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_dialect_is_document_error() {
        let err = ProblemsError::UnsupportedDialect {
            tag: "hl7v2".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Document);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("hl7v2"));
    }

    #[test]
    fn test_incomplete_entry_message_is_one_based() {
        let err = ProblemsError::IncompleteEntry {
            index: 0,
            missing: "status observation".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Problem entry #1 has no status observation"
        );
        assert!(err.recovery_suggestion().contains("--strict"));
    }
}
