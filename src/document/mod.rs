pub mod detect;
pub mod xml;

pub use detect::{detect, parse_bytes, parse_source, strip_bom, ParsedSource};
pub use xml::{XmlDocument, XmlElement};
