//! Template-addressed extraction of problem entries.
//!
//! Both dialects share every step except the section template id: find the
//! problems section, walk its `entry` elements, and read each field out of
//! the nested problem, status and age observation templates.

use crate::core::coerce::parse_int_prefix;
use crate::core::null_flavor::NullFlavor;
use crate::domain::model::{EntryPolicy, EntryWarning, Extraction, ParsedDate, RawFieldRecord};
use crate::domain::ports::{DateParser, DocumentNode};
use crate::utils::error::{ProblemsError, Result};
use std::fmt;

pub const CCDA_PROBLEMS_SECTION: &str = "2.16.840.1.113883.10.20.22.2.5";
pub const VA_C32_PROBLEMS_SECTION: &str = "2.16.840.1.113883.10.20.1.11";

pub const PROBLEM_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.4";
pub const PROBLEM_STATUS_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.6";
pub const AGE_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.31";

/// Substructure an entry cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPart {
    EffectiveTime,
    ProblemObservation,
    StatusObservation,
    AgeObservation,
}

impl fmt::Display for MissingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EffectiveTime => f.write_str("effectiveTime"),
            Self::ProblemObservation => write!(f, "problem observation ({})", PROBLEM_OBSERVATION),
            Self::StatusObservation => {
                write!(f, "status observation ({})", PROBLEM_STATUS_OBSERVATION)
            }
            Self::AgeObservation => write!(f, "age observation ({})", AGE_OBSERVATION),
        }
    }
}

pub struct DialectExtractor<'p, D> {
    section_template: &'static str,
    date_parser: &'p D,
    policy: EntryPolicy,
}

impl<'p, D: DateParser> DialectExtractor<'p, D> {
    pub fn new(section_template: &'static str, date_parser: &'p D) -> Self {
        Self {
            section_template,
            date_parser,
            policy: EntryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn extract<N: DocumentNode>(&self, root: &N) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        let Some(section) = root.template(self.section_template) else {
            tracing::debug!(
                "Problems section {} not found, no problems to extract",
                self.section_template
            );
            return Ok(extraction);
        };

        let entries = section.find_all("entry");
        tracing::debug!(
            "Found {} entries under section {}",
            entries.len(),
            self.section_template
        );

        for (index, entry) in entries.iter().enumerate() {
            match self.extract_entry(entry) {
                Ok(record) => extraction.records.push(record),
                Err(missing) => match self.policy {
                    EntryPolicy::FailFast => {
                        return Err(ProblemsError::IncompleteEntry {
                            index,
                            missing: missing.to_string(),
                        });
                    }
                    EntryPolicy::SkipIncomplete => {
                        tracing::warn!("Skipping problem entry {}: missing {}", index, missing);
                        extraction.warnings.push(EntryWarning {
                            index,
                            missing: missing.to_string(),
                        });
                    }
                },
            }
        }

        Ok(extraction)
    }

    fn extract_entry<N: DocumentNode>(
        &self,
        entry: &N,
    ) -> std::result::Result<RawFieldRecord, MissingPart> {
        let effective_time = entry
            .find("effectiveTime")
            .ok_or(MissingPart::EffectiveTime)?;
        let from = self.bound(&effective_time, "low");
        let to = self.bound(&effective_time, "high");

        let problem = entry
            .template(PROBLEM_OBSERVATION)
            .ok_or(MissingPart::ProblemObservation)?;
        let code_el = problem.find("code");
        let name = owned_attr(code_el.as_ref(), "displayName");
        let code = owned_attr(code_el.as_ref(), "code");
        let code_system = owned_attr(code_el.as_ref(), "codeSystem");

        let status = entry
            .template(PROBLEM_STATUS_OBSERVATION)
            .ok_or(MissingPart::StatusObservation)?;
        let status = owned_attr(status.find("value").as_ref(), "displayName");

        let age = entry
            .template(AGE_OBSERVATION)
            .ok_or(MissingPart::AgeObservation)?;
        let age = age
            .find("value")
            .and_then(|value| value.attr("value").and_then(parse_age));

        Ok(RawFieldRecord {
            from,
            to,
            name,
            code,
            code_system,
            status,
            age,
        })
    }

    fn bound<N: DocumentNode>(&self, effective_time: &N, tag: &str) -> Option<ParsedDate> {
        let bound = effective_time.find(tag);
        if let Some(flavor) = bound.as_ref().and_then(|el| el.attr("nullFlavor")) {
            tracing::debug!(
                "effectiveTime/{} is null: {}",
                tag,
                NullFlavor::from_code(flavor)
            );
        }
        self.date_parser
            .parse_date(bound.as_ref().and_then(|el| el.attr("value")))
    }
}

fn owned_attr<N: DocumentNode>(node: Option<&N>, name: &str) -> Option<String> {
    node.and_then(|n| n.attr(name)).map(str::to_string)
}

fn parse_age(value: &str) -> Option<i64> {
    let age = parse_int_prefix(value);
    if age.is_none() {
        tracing::warn!("Age value {:?} is not a number", value);
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date::Hl7DateParser;
    use crate::document::xml::XmlDocument;
    use chrono::NaiveDate;

    fn entry(low: &str, code: &str, status: &str, age: &str) -> String {
        format!(
            r#"<entry>
  <act>
    <effectiveTime><low value="{low}"/></effectiveTime>
    <entryRelationship>
      <observation>
        <templateId root="2.16.840.1.113883.10.20.22.4.4"/>
        <code code="{code}" codeSystem="2.16.840.1.113883.6.96" displayName="Problem {code}"/>
        <entryRelationship>
          <observation>
            <templateId root="2.16.840.1.113883.10.20.22.4.6"/>
            <value displayName="{status}"/>
          </observation>
        </entryRelationship>
        <entryRelationship>
          <observation>
            <templateId root="2.16.840.1.113883.10.20.22.4.31"/>
            <value value="{age}"/>
          </observation>
        </entryRelationship>
      </observation>
    </entryRelationship>
  </act>
</entry>"#
        )
    }

    fn document(section: &str, entries: &[String]) -> XmlDocument {
        let xml = format!(
            r#"<ClinicalDocument><component><section><templateId root="{section}"/>{}</section></component></ClinicalDocument>"#,
            entries.concat()
        );
        XmlDocument::parse(&xml).unwrap()
    }

    #[test]
    fn test_extracts_entries_in_order() {
        let doc = document(
            CCDA_PROBLEMS_SECTION,
            &[
                entry("20080103", "233604007", "Resolved", "57"),
                entry("2007", "195967001", "Active", "45yrs"),
            ],
        );
        let parser = Hl7DateParser;
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();

        assert!(extraction.warnings.is_empty());
        assert_eq!(extraction.records.len(), 2);

        let first = &extraction.records[0];
        assert_eq!(
            first.from,
            NaiveDate::from_ymd_opt(2008, 1, 3).map(ParsedDate::Date)
        );
        assert_eq!(first.to, None);
        assert_eq!(first.name.as_deref(), Some("Problem 233604007"));
        assert_eq!(first.code.as_deref(), Some("233604007"));
        assert_eq!(first.code_system.as_deref(), Some("2.16.840.1.113883.6.96"));
        assert_eq!(first.status.as_deref(), Some("Resolved"));
        assert_eq!(first.age, Some(57));

        assert_eq!(extraction.records[1].code.as_deref(), Some("195967001"));
        assert_eq!(extraction.records[1].age, Some(45));
    }

    #[test]
    fn test_missing_section_is_empty() {
        let doc = document(VA_C32_PROBLEMS_SECTION, &[entry("2007", "1", "Active", "1")]);
        let parser = Hl7DateParser;
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn test_fake_date_parser_is_called_for_absent_bounds() {
        let doc = document(CCDA_PROBLEMS_SECTION, &[entry("2007", "1", "Active", "1")]);
        let sentinel = NaiveDate::from_ymd_opt(1900, 1, 1).map(ParsedDate::Date);
        let parser = move |value: Option<&str>| match value {
            Some(_) => None,
            None => sentinel,
        };
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();
        // low is present, high is absent
        assert_eq!(extraction.records[0].from, None);
        assert_eq!(extraction.records[0].to, sentinel);
    }

    #[test]
    fn test_null_flavored_bound_is_absent() {
        let xml = entry("2007", "1", "Active", "1").replace(
            r#"<low value="2007"/>"#,
            r#"<low nullFlavor="UNK"/><high value="2009"/>"#,
        );
        let doc = document(CCDA_PROBLEMS_SECTION, &[xml]);
        let parser = Hl7DateParser;
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();
        assert_eq!(extraction.records[0].from, None);
        assert_eq!(
            extraction.records[0].to,
            NaiveDate::from_ymd_opt(2009, 1, 1).map(ParsedDate::Date)
        );
    }

    #[test]
    fn test_incomplete_entry_is_skipped_by_default() {
        let without_status = entry("2007", "2", "Active", "1")
            .replace("2.16.840.1.113883.10.20.22.4.6", "9.9.9");
        let doc = document(
            CCDA_PROBLEMS_SECTION,
            &[entry("2007", "1", "Active", "1"), without_status],
        );
        let parser = Hl7DateParser;
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].index, 1);
        assert_eq!(
            extraction.warnings[0].missing,
            MissingPart::StatusObservation.to_string()
        );
    }

    #[test]
    fn test_incomplete_entry_fails_fast_when_asked() {
        let without_age = entry("2007", "2", "Active", "1")
            .replace("2.16.840.1.113883.10.20.22.4.31", "9.9.9");
        let doc = document(CCDA_PROBLEMS_SECTION, &[without_age]);
        let parser = Hl7DateParser;
        let err = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .with_policy(EntryPolicy::FailFast)
            .extract(&doc.root())
            .unwrap_err();

        match err {
            ProblemsError::IncompleteEntry { index, missing } => {
                assert_eq!(index, 0);
                assert!(missing.starts_with("age observation"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_age_is_none() {
        let doc = document(CCDA_PROBLEMS_SECTION, &[entry("2007", "1", "Active", "abc")]);
        let parser = Hl7DateParser;
        let extraction = DialectExtractor::new(CCDA_PROBLEMS_SECTION, &parser)
            .extract(&doc.root())
            .unwrap();
        assert_eq!(extraction.records[0].age, None);
    }
}
