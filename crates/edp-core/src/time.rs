//! Datetime axis primitives: resolution strings, time index bounds and the
//! cell formats used for timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EdpError, EdpResult};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    DATETIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp cell. Date-only cells map to midnight.
pub fn parse_datetime(value: &str) -> EdpResult<NaiveDateTime> {
    let trimmed = value.trim();
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EdpError::Parse(format!("invalid datetime '{trimmed}'")))
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Unit of a [`Resolution`], ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolutionUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl ResolutionUnit {
    fn seconds(self) -> i64 {
        match self {
            ResolutionUnit::Second => 1,
            ResolutionUnit::Minute => 60,
            ResolutionUnit::Hour => 3_600,
            ResolutionUnit::Day => 86_400,
        }
    }

    fn alias(self) -> &'static str {
        match self {
            ResolutionUnit::Second => "S",
            ResolutionUnit::Minute => "min",
            ResolutionUnit::Hour => "H",
            ResolutionUnit::Day => "D",
        }
    }
}

/// Fixed step between consecutive timestamps, written as an offset alias
/// such as `H`, `15min` or `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub multiple: u32,
    pub unit: ResolutionUnit,
}

impl Resolution {
    pub const HOURLY: Resolution = Resolution {
        multiple: 1,
        unit: ResolutionUnit::Hour,
    };

    pub fn new(multiple: u32, unit: ResolutionUnit) -> EdpResult<Self> {
        if multiple == 0 {
            return Err(EdpError::InvalidArgument(
                "resolution multiple must be positive".into(),
            ));
        }
        Ok(Self { multiple, unit })
    }

    pub fn step_seconds(&self) -> i64 {
        i64::from(self.multiple) * self.unit.seconds()
    }

    pub fn step(&self) -> Duration {
        Duration::seconds(self.step_seconds())
    }

    /// Express a step in the coarsest unit that divides it exactly.
    pub fn from_step(step: Duration) -> EdpResult<Self> {
        let seconds = step.num_seconds();
        if seconds <= 0 || step != Duration::seconds(seconds) {
            return Err(EdpError::Validation(format!(
                "time step of {seconds}s cannot be expressed as a resolution"
            )));
        }
        for unit in [
            ResolutionUnit::Day,
            ResolutionUnit::Hour,
            ResolutionUnit::Minute,
            ResolutionUnit::Second,
        ] {
            if seconds % unit.seconds() == 0 {
                let multiple = u32::try_from(seconds / unit.seconds()).map_err(|_| {
                    EdpError::Validation(format!("time step of {seconds}s is too large"))
                })?;
                return Resolution::new(multiple, unit);
            }
        }
        unreachable!("every positive step is divisible by one second")
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple == 1 {
            f.write_str(self.unit.alias())
        } else {
            write!(f, "{}{}", self.multiple, self.unit.alias())
        }
    }
}

impl FromStr for Resolution {
    type Err = EdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| EdpError::InvalidArgument(format!("resolution '{trimmed}' has no unit")))?;
        let (value_str, unit_str) = trimmed.split_at(split);
        let multiple = if value_str.is_empty() {
            1
        } else {
            value_str.parse::<u32>().map_err(|err| {
                EdpError::InvalidArgument(format!("parsing resolution '{trimmed}': {err}"))
            })?
        };
        let unit = match unit_str {
            "S" | "s" => ResolutionUnit::Second,
            "T" | "min" => ResolutionUnit::Minute,
            "H" | "h" => ResolutionUnit::Hour,
            "D" | "d" => ResolutionUnit::Day,
            other => {
                return Err(EdpError::InvalidArgument(format!(
                    "unsupported resolution unit '{other}'; expected S, min, H or D"
                )))
            }
        };
        Resolution::new(multiple, unit)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for timestamp cells in the canonical text form.
pub mod datetime_cell {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_datetime(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).map_err(serde::de::Error::custom)
    }
}

/// The datetime axis a stacked series spans: `start..=stop` every `resolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeIndex {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub resolution: Resolution,
}

impl TimeIndex {
    /// Infer bounds and resolution from an ordered, uniformly spaced axis.
    pub fn infer(index: &[NaiveDateTime]) -> EdpResult<Self> {
        let (first, last) = match (index.first(), index.last()) {
            (Some(first), Some(last)) if index.len() >= 2 => (*first, *last),
            _ => {
                return Err(EdpError::Validation(format!(
                    "cannot infer a resolution from {} timestamp(s)",
                    index.len()
                )))
            }
        };
        let step = index[1] - index[0];
        if let Some(pos) = index.windows(2).position(|pair| pair[1] - pair[0] != step) {
            return Err(EdpError::Validation(format!(
                "datetime index is not uniform: step changes after {}",
                format_datetime(&index[pos])
            )));
        }
        Ok(Self {
            start: first,
            stop: last,
            resolution: Resolution::from_step(step)?,
        })
    }

    /// Number of timestamps between start and stop inclusive.
    pub fn periods(&self) -> EdpResult<usize> {
        let span = (self.stop - self.start).num_seconds();
        let step = self.resolution.step_seconds();
        if span < 0 {
            return Err(EdpError::Validation(format!(
                "timeindex_stop {} precedes timeindex_start {}",
                format_datetime(&self.stop),
                format_datetime(&self.start)
            )));
        }
        if span % step != 0 {
            return Err(EdpError::Validation(format!(
                "timeindex_stop {} is not reachable from {} in steps of {}",
                format_datetime(&self.stop),
                format_datetime(&self.start),
                self.resolution
            )));
        }
        Ok((span / step) as usize + 1)
    }

    /// Materialize the axis.
    pub fn timestamps(&self) -> EdpResult<Vec<NaiveDateTime>> {
        let periods = self.periods()?;
        let step = self.resolution.step();
        Ok((0..periods)
            .scan(self.start, |current, _| {
                let value = *current;
                *current += step;
                Some(value)
            })
            .collect())
    }

    /// Names of the fields that differ from `other`.
    pub fn differences(&self, other: &TimeIndex) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.start != other.start {
            fields.push("timeindex_start");
        }
        if self.stop != other.stop {
            fields.push("timeindex_stop");
        }
        if self.resolution != other.resolution {
            fields.push("timeindex_resolution");
        }
        fields
    }
}

impl fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {} @ {}",
            format_datetime(&self.start),
            format_datetime(&self.stop),
            self.resolution
        )
    }
}
