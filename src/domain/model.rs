use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized HL7 timestamp. Values with at least hour and minute precision
/// carry an offset; shorter values are plain calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedDate {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Fields pulled out of one problem entry, before reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFieldRecord {
    pub from: Option<ParsedDate>,
    pub to: Option<ParsedDate>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub code_system: Option<String>,
    pub status: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<ParsedDate>,
    pub to: Option<ParsedDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub date: DateRange,
    pub name: Option<String>,
    pub status: Option<String>,
    pub age: Option<i64>,
    pub code: Option<String>,
    pub code_system: Option<String>,
}

impl From<RawFieldRecord> for ProblemRecord {
    fn from(raw: RawFieldRecord) -> Self {
        Self {
            date: DateRange {
                from: raw.from,
                to: raw.to,
            },
            name: raw.name,
            status: raw.status,
            age: raw.age,
            code: raw.code,
            code_system: raw.code_system,
        }
    }
}

/// An entry that was left out of the result because part of it was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryWarning {
    pub index: usize,
    pub missing: String,
}

/// Extractor output: the records plus any entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<RawFieldRecord>,
    pub warnings: Vec<EntryWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemsReport {
    pub problems: Vec<ProblemRecord>,
    pub warnings: Vec<EntryWarning>,
}

/// What to do with an entry whose required sub-template is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    #[default]
    SkipIncomplete,
    FailFast,
}

/// Flattened row used for the CSV and TSV outputs.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemRow {
    pub from: Option<String>,
    pub to: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub age: Option<i64>,
    pub code: Option<String>,
    pub code_system: Option<String>,
}

impl From<&ProblemRecord> for ProblemRow {
    fn from(record: &ProblemRecord) -> Self {
        Self {
            from: record.date.from.map(|d| d.to_string()),
            to: record.date.to.map(|d| d.to_string()),
            name: record.name.clone(),
            status: record.status.clone(),
            age: record.age,
            code: record.code.clone(),
            code_system: record.code_system.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub problems: Vec<ProblemRecord>,
    pub json_output: Option<String>,
    pub csv_output: Option<String>,
    pub tsv_output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_record_field_order() {
        let record = ProblemRecord::from(RawFieldRecord {
            from: Some(ParsedDate::Date(NaiveDate::from_ymd_opt(2008, 1, 3).unwrap())),
            to: None,
            name: Some("Pneumonia".to_string()),
            code: Some("233604007".to_string()),
            code_system: Some("2.16.840.1.113883.6.96".to_string()),
            status: Some("Resolved".to_string()),
            age: None,
        });

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"date":{"from":"2008-01-03","to":null},"name":"Pneumonia","status":"Resolved","age":null,"code":"233604007","code_system":"2.16.840.1.113883.6.96"}"#
        );
    }

    #[test]
    fn test_parsed_date_display() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = NaiveDate::from_ymd_opt(2010, 10, 28)
            .unwrap()
            .and_hms_opt(9, 20, 16)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        assert_eq!(
            ParsedDate::DateTime(dt).to_string(),
            "2010-10-28T09:20:16-05:00"
        );
    }
}
