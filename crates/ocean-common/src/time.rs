//! Decoding of numeric time coordinates.
//!
//! Chunked array stores label their time axis with a units string such as
//! `"days since 1950-01-01"` or `"seconds since 1970-01-01 00:00:00"`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Unit of a numeric time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "second" | "seconds" | "s" => Some(Self::Seconds),
            "minute" | "minutes" | "min" => Some(Self::Minutes),
            "hour" | "hours" | "h" => Some(Self::Hours),
            "day" | "days" | "d" => Some(Self::Days),
            _ => None,
        }
    }

    fn seconds(&self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3600.0,
            Self::Days => 86400.0,
        }
    }
}

/// Parsed `"<unit> since <epoch>"` specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a units string. The epoch may be a date, a date and time
    /// separated by a space or `T`, with an optional trailing `Z`.
    pub fn parse(units: &str) -> GridResult<Self> {
        let invalid = || GridError::InvalidTimeUnits(units.to_string());

        let (unit, rest) = units.trim().split_once(' ').ok_or_else(invalid)?;
        let unit = TimeUnit::parse(unit).ok_or_else(invalid)?;
        let rest = rest.trim_start();
        let epoch = rest
            .strip_prefix("since")
            .ok_or_else(invalid)?
            .trim();

        let epoch = parse_epoch(epoch).ok_or_else(invalid)?;
        Ok(Self { unit, epoch })
    }

    /// Convert a numeric offset into a calendar time. Non-finite offsets give `None`.
    pub fn decode(&self, value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit.seconds() * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        self.epoch.checked_add_signed(Duration::milliseconds(millis as i64))
    }

    pub fn decode_all(&self, values: &[f64]) -> Vec<Option<DateTime<Utc>>> {
        values.iter().map(|&v| self.decode(v)).collect()
    }
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim_end_matches('Z').trim();
    let normalized = s.replacen('T', " ", 1);

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}
