use crate::core::processor::Dialect;
use crate::utils::error::{ProblemsError, Result};

pub const OUTPUT_FORMATS: [&str; 3] = ["json", "csv", "tsv"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ProblemsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ProblemsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(ProblemsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(ProblemsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

/// Accepts `auto` or any tag [`Dialect`] parses.
pub fn validate_dialect_tag(field_name: &str, tag: &str) -> Result<()> {
    if tag == "auto" {
        return Ok(());
    }
    tag.parse::<Dialect>()
        .map(|_| ())
        .map_err(|_| ProblemsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: tag.to_string(),
            reason: "Expected one of: auto, ccda, va_c32, json".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input", "docs/ccd.xml").is_ok());
        assert!(validate_path("input", "").is_err());
        assert!(validate_path("input", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["json".to_string(), "tsv".to_string()];
        assert!(validate_output_formats("formats", &formats).is_ok());
        assert!(validate_output_formats("formats", &[]).is_err());
        assert!(validate_output_formats("formats", &["xml".to_string()]).is_err());
    }

    #[test]
    fn test_validate_dialect_tag() {
        assert!(validate_dialect_tag("dialect", "auto").is_ok());
        assert!(validate_dialect_tag("dialect", "va_c32").is_ok());
        assert!(validate_dialect_tag("dialect", "c32").is_err());
    }
}
