//! Row types for the two record kinds. Field order follows the full header
//! of each kind so a serialized row lines up with
//! [`crate::schema::SCALARS_HEADER`] / [`crate::schema::TIMESERIES_HEADER`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EdpError, EdpResult};
use crate::schema::RecordKind;
use crate::series::series_cell;
use crate::time::{datetime_cell, format_datetime, Resolution, TimeIndex};

/// Column lookup by name, shared by the table utilities.
pub trait Record {
    const KIND: RecordKind;

    /// Text value of `column`, `None` for an empty cell.
    fn value(&self, column: &str) -> EdpResult<Option<String>>;
}

/// One fact about a named entity in a scenario.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScalarRecord {
    #[serde(default)]
    pub id_scal: Option<i64>,
    pub scenario: String,
    pub name: String,
    pub var_name: String,
    pub carrier: String,
    pub region: String,
    pub tech: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub var_value: Option<f64>,
    #[serde(default)]
    pub var_unit: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ScalarRecord {
    /// Value of one of the text dimension columns.
    pub fn dimension(&self, column: &str) -> Option<&str> {
        match column {
            "scenario" => Some(&self.scenario),
            "name" => Some(&self.name),
            "var_name" => Some(&self.var_name),
            "carrier" => Some(&self.carrier),
            "region" => Some(&self.region),
            "tech" => Some(&self.tech),
            "type" => Some(&self.kind),
            _ => None,
        }
    }

    pub fn set_dimension(&mut self, column: &str, value: &str) -> EdpResult<()> {
        let slot = match column {
            "scenario" => &mut self.scenario,
            "name" => &mut self.name,
            "var_name" => &mut self.var_name,
            "carrier" => &mut self.carrier,
            "region" => &mut self.region,
            "tech" => &mut self.tech,
            "type" => &mut self.kind,
            other => return Err(EdpError::UnknownColumn(other.to_string())),
        };
        *slot = value.to_string();
        Ok(())
    }
}

impl Record for ScalarRecord {
    const KIND: RecordKind = RecordKind::Scalars;

    fn value(&self, column: &str) -> EdpResult<Option<String>> {
        if let Some(value) = self.dimension(column) {
            return Ok(Some(value.to_string()));
        }
        Ok(match column {
            "id_scal" => self.id_scal.map(|id| id.to_string()),
            "var_value" => self.var_value.map(|v| v.to_string()),
            "var_unit" => self.var_unit.clone(),
            "reference" => self.reference.clone(),
            "comment" => self.comment.clone(),
            other => return Err(EdpError::UnknownColumn(other.to_string())),
        })
    }
}

/// One stacked time series with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    #[serde(default)]
    pub id_ts: Option<i64>,
    pub region: String,
    pub var_name: String,
    #[serde(with = "datetime_cell")]
    pub timeindex_start: NaiveDateTime,
    #[serde(with = "datetime_cell")]
    pub timeindex_stop: NaiveDateTime,
    pub timeindex_resolution: Resolution,
    #[serde(with = "series_cell")]
    pub series: Vec<f64>,
    #[serde(default)]
    pub var_unit: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TimeseriesRecord {
    pub fn time_index(&self) -> TimeIndex {
        TimeIndex {
            start: self.timeindex_start,
            stop: self.timeindex_stop,
            resolution: self.timeindex_resolution,
        }
    }

    /// Fails unless the series length matches the periods its index implies.
    pub fn validate_length(&self) -> EdpResult<()> {
        let expected = self.time_index().periods()?;
        if expected != self.series.len() {
            return Err(EdpError::SeriesLength {
                var_name: self.var_name.clone(),
                expected,
                actual: self.series.len(),
            });
        }
        Ok(())
    }
}

impl Record for TimeseriesRecord {
    const KIND: RecordKind = RecordKind::Timeseries;

    fn value(&self, column: &str) -> EdpResult<Option<String>> {
        Ok(match column {
            "id_ts" => self.id_ts.map(|id| id.to_string()),
            "region" => Some(self.region.clone()),
            "var_name" => Some(self.var_name.clone()),
            "timeindex_start" => Some(format_datetime(&self.timeindex_start)),
            "timeindex_stop" => Some(format_datetime(&self.timeindex_stop)),
            "timeindex_resolution" => Some(self.timeindex_resolution.to_string()),
            "series" => Some(crate::series::encode_series(&self.series)),
            "var_unit" => self.var_unit.clone(),
            "source" => self.source.clone(),
            "comment" => self.comment.clone(),
            other => return Err(EdpError::UnknownColumn(other.to_string())),
        })
    }
}
