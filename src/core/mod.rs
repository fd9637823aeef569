pub mod coerce;
pub mod date;
pub mod engine;
pub mod extractor;
pub mod null_flavor;
pub mod pipeline;
pub mod processor;

pub use crate::domain::model::{ProblemRecord, ProblemsReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
