use crate::domain::model::{EntryPolicy, ParsedDate, ProblemsReport, TransformResult};
use crate::utils::error::Result;

/// Read-only view of a clinical document tree.
///
/// Lookups search descendants in document order, the way the DOM's
/// `getElementsByTagName` does, so `find("effectiveTime")` on an `entry`
/// reaches the element nested inside its act.
pub trait DocumentNode: Sized {
    /// The element owning the first `templateId` descendant whose `root`
    /// matches, or the node itself when its own `templateId` matches.
    fn template(&self, template_id: &str) -> Option<Self>;

    fn find_all(&self, tag: &str) -> Vec<Self>;

    fn find(&self, tag: &str) -> Option<Self> {
        self.find_all(tag).into_iter().next()
    }

    fn attr(&self, name: &str) -> Option<&str>;
}

pub trait DateParser {
    fn parse_date(&self, value: Option<&str>) -> Option<ParsedDate>;
}

impl<F> DateParser for F
where
    F: Fn(Option<&str>) -> Option<ParsedDate>,
{
    fn parse_date(&self, value: Option<&str>) -> Option<ParsedDate> {
        self(value)
    }
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn dialect(&self) -> Option<&str>;
    fn output_formats(&self) -> &[String];
    fn entry_policy(&self) -> EntryPolicy;
    fn pretty_json(&self) -> bool;
}

pub trait Pipeline: Send + Sync {
    fn extract(&self) -> Result<ProblemsReport>;
    fn transform(&self, report: ProblemsReport) -> Result<TransformResult>;
    fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
