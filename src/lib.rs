pub mod config;
pub mod core;
pub mod document;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, RunConfig};

pub use crate::core::{
    engine::{ExtractionEngine, RunSummary},
    pipeline::ProblemsPipeline,
    processor::{Dialect, ProblemsProcessor, Source},
};
pub use document::{detect, parse_bytes, parse_source, ParsedSource, XmlDocument, XmlElement};
pub use domain::model::{
    DateRange, EntryPolicy, EntryWarning, ParsedDate, ProblemRecord, ProblemsReport,
};
pub use domain::ports::{DateParser, DocumentNode};
pub use utils::error::{ProblemsError, Result};
