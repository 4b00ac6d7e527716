//! Date recovery for spreadsheet cells whose format is not declared anywhere.
//!
//! Every accepted value is reduced to its calendar day at 00:00 UTC. Anything
//! that cannot be read as a real calendar day yields `None`; parsing never
//! fails loudly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer};

use crate::config::Config;
use crate::models::import::CellValue;

/// Day zero of the spreadsheet serial date system.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const DEFAULT_OFFSET_SECONDS: i32 = 7 * 3600;

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})$").expect("valid day/month/year pattern"));
static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})[/-]([0-9]{1,2})[/-]([0-9]{1,2})$").expect("valid year/month/day pattern"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[/-]([0-9]{4})$").expect("valid month/year pattern"));
static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})$").expect("valid year pattern"));
static DOTTED_DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})$").expect("valid dotted date pattern"));

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: [&str; 4] = ["%B %d, %Y", "%B %d %Y", "%d %B %Y", "%a %b %d %Y"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateParser {
    offset: FixedOffset,
    month_first_fallback: bool,
}

impl Default for DateParser {
    fn default() -> Self {
        DateParser {
            offset: fixed_offset(DEFAULT_OFFSET_SECONDS),
            month_first_fallback: false,
        }
    }
}

impl DateParser {
    pub fn new(offset_hours: i32, month_first_fallback: bool) -> Self {
        DateParser {
            offset: fixed_offset(offset_hours.saturating_mul(3600)),
            month_first_fallback,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.import_utc_offset_hours, config.import_month_first_fallback)
    }

    pub fn parse(&self, cell: &CellValue) -> Option<DateTime<Utc>> {
        if cell.is_blank() {
            return None;
        }

        match cell {
            CellValue::Number(serial) => from_serial(*serial),
            CellValue::Text(text) => self.parse_text(text.trim()),
            CellValue::Date(date) => Some(normalize(*date)),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    fn parse_text(&self, text: &str) -> Option<DateTime<Utc>> {
        if text.is_empty() {
            return None;
        }

        // D/M/YYYY owns every N/N/YYYY string. The month-first reading is
        // only consulted when the fallback is switched on.
        if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
            let (first, second, year) = (group(&caps, 1)?, group(&caps, 2)?, group(&caps, 3)?);
            let day_first = calendar_day(year as i32, second, first);
            if day_first.is_some() || !self.month_first_fallback {
                return day_first;
            }
            if second > 12 {
                return calendar_day(year as i32, first, second);
            }
            return None;
        }

        if let Some(caps) = YEAR_MONTH_DAY.captures(text) {
            return calendar_day(group(&caps, 1)? as i32, group(&caps, 2)?, group(&caps, 3)?);
        }

        if let Some(caps) = MONTH_YEAR.captures(text) {
            return calendar_day(group(&caps, 2)? as i32, group(&caps, 1)?, 1);
        }

        if let Some(caps) = YEAR_ONLY.captures(text) {
            return calendar_day(group(&caps, 1)? as i32, 1, 1);
        }

        if let Some(caps) = DOTTED_DAY_MONTH_YEAR.captures(text) {
            return calendar_day(group(&caps, 3)? as i32, group(&caps, 2)?, group(&caps, 1)?);
        }

        self.parse_generic(text)
    }

    fn parse_generic(&self, text: &str) -> Option<DateTime<Utc>> {
        if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
            return Some(midnight(zoned.with_timezone(&self.offset).date_naive()));
        }
        if let Ok(zoned) = DateTime::parse_from_rfc2822(text) {
            return Some(midnight(zoned.with_timezone(&self.offset).date_naive()));
        }
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(local) = NaiveDateTime::parse_from_str(text, format) {
                return Some(midnight(local.date()));
            }
        }
        for format in NAIVE_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(midnight(date));
            }
        }
        None
    }
}

/// Drops the time of day, keeping the UTC calendar day.
pub fn normalize(date: DateTime<Utc>) -> DateTime<Utc> {
    midnight(date.date_naive())
}

fn from_serial(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() {
        return None;
    }
    let days = TimeDelta::try_days(serial.floor() as i64)?;
    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_signed(days).map(midnight)
}

fn calendar_day(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn group(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn fixed_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

/// Serde adapter so request bodies accept the same date shapes as imports.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Number(f64),
        Text(String),
    }

    let raw = Option::<RawDate>::deserialize(deserializer)?;
    let cell = match raw {
        Some(RawDate::Number(serial)) => CellValue::Number(serial),
        Some(RawDate::Text(text)) => CellValue::Text(text),
        None => CellValue::Empty,
    };
    Ok(DateParser::default().parse(&cell))
}
