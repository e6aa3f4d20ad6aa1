//! Static column schemas for the two record kinds.
//!
//! Headers are compile-time constants; resolving a kind never allocates
//! mutable state. Required columns are everything in the full header that
//! is not optional, kept in header order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EdpError, EdpResult};

/// Record kinds understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Scalars,
    Timeseries,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Scalars, RecordKind::Timeseries];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Scalars => "scalars",
            RecordKind::Timeseries => "timeseries",
        }
    }

    pub fn header(&self) -> &'static Header {
        match self {
            RecordKind::Scalars => &SCALARS_HEADER,
            RecordKind::Timeseries => &TIMESERIES_HEADER,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = EdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "scalars" => Ok(RecordKind::Scalars),
            "timeseries" => Ok(RecordKind::Timeseries),
            other => Err(EdpError::InvalidArgument(format!(
                "unknown record kind '{other}'; use 'scalars' or 'timeseries'"
            ))),
        }
    }
}

/// Ordered column list plus the subset that may be absent from a file.
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    pub full: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub const SCALARS_HEADER: Header = Header {
    full: &[
        "id_scal",
        "scenario",
        "name",
        "var_name",
        "carrier",
        "region",
        "tech",
        "type",
        "var_value",
        "var_unit",
        "reference",
        "comment",
    ],
    optional: &["id_scal", "var_unit", "reference", "comment"],
};

pub const TIMESERIES_HEADER: Header = Header {
    full: &[
        "id_ts",
        "region",
        "var_name",
        "timeindex_start",
        "timeindex_stop",
        "timeindex_resolution",
        "series",
        "var_unit",
        "source",
        "comment",
    ],
    optional: &["id_ts", "var_unit", "source", "comment"],
};

impl Header {
    pub fn is_optional(&self, column: &str) -> bool {
        self.optional.contains(&column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.full.contains(&column)
    }

    pub fn required(&self) -> Vec<&'static str> {
        self.full
            .iter()
            .copied()
            .filter(|column| !self.is_optional(column))
            .collect()
    }

    /// Required columns absent from `columns`, in header order.
    pub fn missing_required<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        self.required()
            .into_iter()
            .filter(|required| !columns.iter().any(|c| c.as_ref() == *required))
            .map(String::from)
            .collect()
    }

    /// Fails with [`EdpError::MissingColumns`] unless every required column is present.
    pub fn check_required<S: AsRef<str>>(&self, kind: RecordKind, columns: &[S]) -> EdpResult<()> {
        let missing = self.missing_required(columns);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EdpError::MissingColumns {
                kind,
                columns: missing,
            })
        }
    }
}

/// Resolve a kind tag into `(full, optional, required)` column lists.
pub fn optional_required_header(
    tag: &str,
) -> EdpResult<(Vec<&'static str>, Vec<&'static str>, Vec<&'static str>)> {
    let kind: RecordKind = tag.parse()?;
    let header = kind.header();
    Ok((header.full.to_vec(), header.optional.to_vec(), header.required()))
}
