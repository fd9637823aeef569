pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::EntryPolicy;
use crate::utils::error::{ProblemsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, clap::Parser)]
#[command(name = "cda-problems")]
#[command(about = "Extract the problem list from C-CDA and C32 documents")]
pub struct CliConfig {
    #[arg(help = "Input document (XML or JSON)")]
    pub input: Option<String>,

    #[arg(long, help = "Document type: auto, ccda, va_c32 or json")]
    pub dialect: Option<String>,

    #[arg(long, help = "TOML config file")]
    pub config: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Output formats: json, csv, tsv")]
    pub formats: Vec<String>,

    #[arg(long, help = "Fail on the first incomplete problem entry")]
    pub strict: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layer the flags over the config file (if any) and the defaults.
    pub fn resolve(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut config = RunConfig::from_toml(&file);
        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(dialect) = &self.dialect {
            config.dialect = Some(dialect.clone());
        }
        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }
        if !self.formats.is_empty() {
            config.output_formats = self.formats.clone();
        }
        if self.strict {
            config.entry_policy = EntryPolicy::FailFast;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Settings for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub input_path: String,
    pub dialect: Option<String>,
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub entry_policy: EntryPolicy,
    pub pretty_json: bool,
}

impl RunConfig {
    pub fn new(input_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            dialect: None,
            output_path: output_path.into(),
            output_formats: vec!["json".to_string()],
            entry_policy: EntryPolicy::default(),
            pretty_json: true,
        }
    }

    pub fn from_toml(file: &TomlConfig) -> Self {
        let mut config = Self::new(
            file.input.path.clone().unwrap_or_default(),
            file.output
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
        );
        config.dialect = file.input.dialect.clone();
        if let Some(formats) = &file.output.formats {
            config.output_formats = formats.clone();
        }
        if let Some(policy) = file.extraction.entry_policy {
            config.entry_policy = policy;
        }
        if let Some(pretty) = file.output.pretty {
            config.pretty_json = pretty;
        }
        config
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        if self.input_path.is_empty() {
            return Err(ProblemsError::MissingConfigError {
                field: "input".to_string(),
            });
        }
        validation::validate_path("input", &self.input_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.output_formats)?;
        if let Some(dialect) = &self.dialect {
            validation::validate_dialect_tag("dialect", dialect)?;
        }
        Ok(())
    }
}

impl ConfigProvider for RunConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref().filter(|tag| *tag != "auto")
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn entry_policy(&self) -> EntryPolicy {
        self.entry_policy
    }

    fn pretty_json(&self) -> bool {
        self.pretty_json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_dialect_means_detect() {
        let mut config = RunConfig::new("ccd.xml", "out");
        config.dialect = Some("auto".to_string());
        assert_eq!(config.dialect(), None);
        config.dialect = Some("ccda".to_string());
        assert_eq!(config.dialect(), Some("ccda"));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let config = RunConfig::from_toml(&TomlConfig::default());
        assert_eq!(config.output_path, DEFAULT_OUTPUT_PATH);
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_flags_override_config_file() {
        use clap::Parser;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[input]\npath = \"from-file.xml\"\n[output]\nformats = [\"csv\"]\npretty = false"
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "cda-problems",
            "from-flag.xml",
            "--config",
            file.path().to_str().unwrap(),
            "--strict",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.input_path, "from-flag.xml");
        assert_eq!(config.output_formats, vec!["csv".to_string()]);
        assert_eq!(config.entry_policy, EntryPolicy::FailFast);
        assert!(!config.pretty_json);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_formats_flag_is_comma_separated() {
        use clap::Parser;

        let cli = CliConfig::parse_from(["cda-problems", "ccd.xml", "--formats", "json,tsv"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.output_formats, vec!["json", "tsv"]);
        assert_eq!(config.entry_policy, EntryPolicy::SkipIncomplete);
    }
}
