use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use edp_core::{EdpError, EdpResult, Resolution, TimeIndex, TimeseriesRecord};
use polars::prelude::*;

/// Name of the datetime column leading every frame.
pub const INDEX_COLUMN: &str = "timeindex";

/// Column-wise time series: a `Datetime` index column followed by one
/// `Float64` column per series. Missing values are nulls in the frame and
/// NaN on the Rust side.
#[derive(Debug, Clone)]
pub struct UnstackedFrame {
    df: DataFrame,
}

fn to_millis(stamp: &NaiveDateTime) -> i64 {
    (*stamp - NaiveDateTime::default()).num_milliseconds()
}

fn from_millis(millis: i64) -> NaiveDateTime {
    NaiveDateTime::default() + Duration::milliseconds(millis)
}

impl UnstackedFrame {
    pub fn new(index: Vec<NaiveDateTime>) -> EdpResult<Self> {
        let millis: Vec<i64> = index.iter().map(to_millis).collect();
        let index = Series::new(INDEX_COLUMN, millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        Ok(Self {
            df: DataFrame::new(vec![index])?,
        })
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> EdpResult<()> {
        let name = name.into();
        if values.len() != self.height() {
            return Err(EdpError::Validation(format!(
                "column '{name}' has {} values for an index of {} timestamps",
                values.len(),
                self.height()
            )));
        }
        if name == INDEX_COLUMN || self.df.column(&name).is_ok() {
            return Err(EdpError::Validation(format!("duplicate column '{name}'")));
        }
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| (!v.is_nan()).then_some(v))
            .collect();
        self.df.with_column(Series::new(&name, values))?;
        Ok(())
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> EdpResult<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn index(&self) -> EdpResult<Vec<NaiveDateTime>> {
        let millis = self.df.column(INDEX_COLUMN)?.cast(&DataType::Int64)?;
        millis
            .i64()?
            .into_iter()
            .map(|ms| {
                ms.map(from_millis)
                    .ok_or_else(|| EdpError::Validation("frame index holds an empty timestamp".into()))
            })
            .collect()
    }

    /// Series names in column order, without the index column.
    pub fn column_names(&self) -> Vec<&str> {
        self.df.get_column_names().into_iter().skip(1).collect()
    }

    /// Values of one series; nulls read as NaN.
    pub fn values(&self, name: &str) -> EdpResult<Vec<f64>> {
        if name == INDEX_COLUMN {
            return Err(EdpError::UnknownColumn(name.to_string()));
        }
        let values = self
            .df
            .column(name)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        Ok(values)
    }

    pub fn as_frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width().saturating_sub(1)
    }
}

fn same_values(left: &[f64], right: &[f64]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| l == r || (l.is_nan() && r.is_nan()))
}

impl PartialEq for UnstackedFrame {
    fn eq(&self, other: &Self) -> bool {
        let names = self.column_names();
        names == other.column_names()
            && self.index().ok() == other.index().ok()
            && names.iter().all(|name| {
                match (self.values(name), other.values(name)) {
                    (Ok(left), Ok(right)) => same_values(&left, &right),
                    _ => false,
                }
            })
    }
}

/// Row-wise form of one frame column as produced by [`stack`].
#[derive(Debug, Clone, PartialEq)]
pub struct StackedSeries {
    pub var_name: String,
    pub timeindex_start: NaiveDateTime,
    pub timeindex_stop: NaiveDateTime,
    pub timeindex_resolution: Resolution,
    pub series: Vec<f64>,
}

impl StackedSeries {
    pub fn time_index(&self) -> TimeIndex {
        TimeIndex {
            start: self.timeindex_start,
            stop: self.timeindex_stop,
            resolution: self.timeindex_resolution,
        }
    }
}

impl From<StackedSeries> for TimeseriesRecord {
    fn from(row: StackedSeries) -> Self {
        TimeseriesRecord {
            id_ts: None,
            region: String::new(),
            var_name: row.var_name,
            timeindex_start: row.timeindex_start,
            timeindex_stop: row.timeindex_stop,
            timeindex_resolution: row.timeindex_resolution,
            series: row.series,
            var_unit: None,
            source: None,
            comment: None,
        }
    }
}

impl From<&TimeseriesRecord> for StackedSeries {
    fn from(record: &TimeseriesRecord) -> Self {
        StackedSeries {
            var_name: record.var_name.clone(),
            timeindex_start: record.timeindex_start,
            timeindex_stop: record.timeindex_stop,
            timeindex_resolution: record.timeindex_resolution,
            series: record.series.clone(),
        }
    }
}

/// Turn every frame column into one stacked row.
///
/// The index must hold at least two uniformly spaced timestamps so the
/// resolution can be inferred.
pub fn stack(frame: &UnstackedFrame) -> EdpResult<Vec<StackedSeries>> {
    let names = frame.column_names();
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let index = TimeIndex::infer(&frame.index()?)?;
    names
        .into_iter()
        .map(|name| {
            Ok(StackedSeries {
                var_name: name.to_string(),
                timeindex_start: index.start,
                timeindex_stop: index.stop,
                timeindex_resolution: index.resolution,
                series: frame.values(name)?,
            })
        })
        .collect()
}

/// Rebuild the shared datetime axis and spread each row into a column.
///
/// Rows must agree on start, stop and resolution, each series must have
/// exactly the number of periods its index implies and var_names must be
/// unique.
pub fn unstack(rows: &[StackedSeries]) -> EdpResult<UnstackedFrame> {
    let Some(first) = rows.first() else {
        return UnstackedFrame::new(Vec::new());
    };
    let reference = first.time_index();
    for row in rows {
        let index = row.time_index();
        let fields = reference.differences(&index);
        if !fields.is_empty() {
            return Err(EdpError::TimeIndexMismatch(format!(
                "series '{}' differs from '{}' in {} ({} vs {})",
                row.var_name,
                first.var_name,
                fields.join(", "),
                index,
                reference
            )));
        }
    }

    let duplicates = duplicate_var_names(rows);
    if !duplicates.is_empty() {
        return Err(EdpError::Validation(format!(
            "duplicate var_name(s) cannot share one frame: {}",
            duplicates.join(", ")
        )));
    }

    let periods = reference.periods()?;
    if let Some(row) = rows.iter().find(|row| row.series.len() != periods) {
        return Err(EdpError::SeriesLength {
            var_name: row.var_name.clone(),
            expected: periods,
            actual: row.series.len(),
        });
    }

    let mut frame = UnstackedFrame::new(reference.timestamps()?)?;
    for row in rows {
        frame.push_column(row.var_name.clone(), row.series.clone())?;
    }
    Ok(frame)
}

/// [`stack`] into full time-series records tagged with `region`.
pub fn stack_records(frame: &UnstackedFrame, region: &str) -> EdpResult<Vec<TimeseriesRecord>> {
    Ok(stack(frame)?
        .into_iter()
        .map(|row| TimeseriesRecord {
            region: region.to_string(),
            ..TimeseriesRecord::from(row)
        })
        .collect())
}

/// [`unstack`] full time-series records; region and optional columns are dropped.
pub fn unstack_records(records: &[TimeseriesRecord]) -> EdpResult<UnstackedFrame> {
    let rows: Vec<StackedSeries> = records.iter().map(StackedSeries::from).collect();
    unstack(&rows)
}

/// Check that every row of every table shares one time index.
///
/// Returns the shared index, or `None` when all tables are empty. On mismatch
/// the error lists each offending table, series and field.
pub fn check_consistency_timeindex(
    tables: &[(&str, &[TimeseriesRecord])],
) -> EdpResult<Option<TimeIndex>> {
    let mut reference: Option<(&str, &str, TimeIndex)> = None;
    let mut problems = Vec::new();
    for (table, records) in tables {
        for record in records.iter() {
            let index = record.time_index();
            let Some((ref_table, ref_series, ref_index)) = reference else {
                reference = Some((*table, record.var_name.as_str(), index));
                continue;
            };
            let fields = ref_index.differences(&index);
            if !fields.is_empty() {
                problems.push(format!(
                    "table '{table}' series '{}' differs from table '{ref_table}' series '{ref_series}' in {} ({index} vs {ref_index})",
                    record.var_name,
                    fields.join(", ")
                ));
            }
        }
    }
    if problems.is_empty() {
        Ok(reference.map(|(_, _, index)| index))
    } else {
        Err(EdpError::TimeIndexMismatch(problems.join("; ")))
    }
}

/// Stacked rows whose var_name appears more than once.
pub fn duplicate_var_names(rows: &[StackedSeries]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for row in rows {
        if !seen.insert(row.var_name.as_str()) && !duplicates.contains(&row.var_name) {
            duplicates.push(row.var_name.clone());
        }
    }
    duplicates
}
