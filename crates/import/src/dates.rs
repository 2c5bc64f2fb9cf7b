use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Hints for reading statement dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateHints {
    /// chrono format strings tried before the built-in ones.
    pub formats: Vec<String>,
    /// Read `01/02/2024` as 1 February rather than January 2.
    pub day_first: bool,
}

const NAMED_MONTH_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y", "%d-%b-%Y", "%Y年%m月%d日"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p", "%H%M%S"];

/// Parse a date written in any of the usual statement styles.
pub fn parse_date(text: &str, hints: &DateHints) -> Result<NaiveDate, ImportError> {
    let s = text.trim();

    for fmt in &hints.formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime.date());
        }
    }

    if let Some(date) = parse_numeric(s, hints.day_first) {
        return Ok(date);
    }

    for fmt in NAMED_MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime.date());
        }
    }

    // "2024-01-05 10:22" and friends in shapes the table above misses.
    if let Some((date_part, _)) = s.split_once([' ', 'T']) {
        if let Some(date) = parse_numeric(date_part, hints.day_first) {
            return Ok(date);
        }
    }

    Err(ImportError::InvalidDate(text.to_string()))
}

/// Parse a time of day, also accepting a full date-time.
pub fn parse_time(text: &str) -> Result<NaiveTime, ImportError> {
    let s = text.trim();

    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(time);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime.time());
        }
    }
    if let Some((_, time_part)) = s.rsplit_once([' ', 'T']) {
        for fmt in TIME_FORMATS {
            if let Ok(time) = NaiveTime::parse_from_str(time_part, fmt) {
                return Ok(time);
            }
        }
    }

    Err(ImportError::InvalidTime(text.to_string()))
}

/// All-digit dates: `20240105`, `2024-01-05`, `2024/1/5`, `01/05/2024`,
/// `5.1.24`. A four-digit first part is always the year. Otherwise the order
/// is month/day/year unless `day_first`, and an impossible month swaps the two.
fn parse_numeric(s: &str, day_first: bool) -> Option<NaiveDate> {
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let y = s[0..4].parse().ok()?;
        let m = s[4..6].parse().ok()?;
        let d = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let parts: Vec<&str> = s.split(['-', '/', '.']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if parts[0].len() == 4 {
        let y = parts[0].parse().ok()?;
        let m = parts[1].parse().ok()?;
        let d = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }

    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let year: i32 = match parts[2].len() {
        2 => 2000 + parts[2].parse::<i32>().ok()?,
        4 => parts[2].parse().ok()?,
        _ => return None,
    };
    let (mut month, mut day) = if day_first { (b, a) } else { (a, b) };
    if month > 12 && day <= 12 {
        std::mem::swap(&mut month, &mut day);
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
