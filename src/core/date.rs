//! HL7 timestamp (`TS`) parsing.
//!
//! Values look like `YYYYMMDDHHMMSS.UUUU[+|-ZZzz]`, with digits dropped from
//! the right to express less precision. Anything with at least hour and
//! minute becomes a timestamp with a fixed offset (UTC when no zone is
//! given); shorter values become calendar dates.

use crate::domain::model::ParsedDate;
use crate::domain::ports::DateParser;
use chrono::{FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Years before this are treated as garbage rather than dates.
const MIN_YEAR: i32 = 1800;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})(\d{2})(\d{2})(\d{2})?(\d{2})?(\d{2})?(\.\d+)?([+-]\d{4}|Z)?")
            .expect("timestamp pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hl7DateParser;

impl DateParser for Hl7DateParser {
    fn parse_date(&self, value: Option<&str>) -> Option<ParsedDate> {
        value.and_then(parse_date)
    }
}

pub fn parse_date(value: &str) -> Option<ParsedDate> {
    if value.len() < 4 || !value.is_ascii() {
        return None;
    }

    let year: i32 = match value[..4].parse() {
        Ok(year) => year,
        Err(_) => {
            tracing::warn!("Unparseable date value {:?}", value);
            return None;
        }
    };
    if year < MIN_YEAR {
        return None;
    }

    let parsed = if value.len() == 4 {
        NaiveDate::from_ymd_opt(year, 1, 1).map(ParsedDate::Date)
    } else if value.len() >= 12 {
        parse_timestamp(value)
    } else {
        parse_calendar_date(value, year)
    };

    if parsed.is_none() {
        tracing::warn!("Unparseable date value {:?}", value);
    }
    parsed
}

fn parse_calendar_date(value: &str, year: i32) -> Option<ParsedDate> {
    let month: u32 = value.get(4..value.len().min(6))?.parse().ok()?;
    let day: u32 = match value.get(6..value.len().min(8)) {
        Some(day) if !day.is_empty() => day.parse().ok()?,
        _ => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day).map(ParsedDate::Date)
}

fn parse_timestamp(value: &str) -> Option<ParsedDate> {
    let caps = timestamp_regex().captures(value)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month = number(2)?;
    let day = number(3)?;
    let hour = number(4)?;
    let minute = number(5)?;
    // fractional seconds (group 7) are dropped
    let second = number(6).unwrap_or(0);
    let offset = parse_offset(caps.get(8).map(|m| m.as_str()).unwrap_or(""))?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(ParsedDate::DateTime)
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || zone == "Z" {
        return FixedOffset::east_opt(0);
    }

    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let hours: i32 = zone.get(1..3)?.parse().ok()?;
    let minutes: i32 = zone.get(3..5)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
