use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use edp_core::{
    format_datetime, parse_datetime, EdpError, EdpResult, RecordKind, TimeseriesRecord,
    TIMESERIES_HEADER,
};
use edp_ts::{stack_records, UnstackedFrame};
use tracing::debug;

use crate::{ensure_parent_dir, format_value, reader_builder, INDEX_COLUMN};

/// Columns whose presence marks a file as stacked.
const STACKED_MARKERS: &[&str] = &[
    "series",
    "var_name",
    "timeindex_start",
    "timeindex_stop",
    "timeindex_resolution",
];

/// On-disk layout of a time-series file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeseriesShape {
    /// One row per series with an encoded `series` cell.
    Stacked,
    /// A datetime first column followed by one column per series.
    Unstacked,
}

/// Decide the layout from a header row.
pub fn sniff_shape<S: AsRef<str>>(headers: &[S]) -> TimeseriesShape {
    if headers
        .iter()
        .any(|h| STACKED_MARKERS.contains(&h.as_ref()))
    {
        TimeseriesShape::Stacked
    } else {
        TimeseriesShape::Unstacked
    }
}

/// Load time series in any supported layout as canonical stacked records.
///
/// Stacked files must carry every required column; missing optional columns
/// are left empty. Unstacked files are stacked on load with an empty region.
/// Each series must match the length its time index implies.
pub fn load_timeseries(path: impl AsRef<Path>) -> EdpResult<Vec<TimeseriesRecord>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading time series");
    read_timeseries(File::open(path)?)
}

pub fn read_timeseries<R: Read>(input: R) -> EdpResult<Vec<TimeseriesRecord>> {
    let mut reader = reader_builder().from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let shape = sniff_shape(&headers);
    debug!(?shape, columns = headers.len(), "sniffed time-series layout");

    match shape {
        TimeseriesShape::Stacked => {
            TIMESERIES_HEADER.check_required(RecordKind::Timeseries, &headers)?;
            let mut records = Vec::new();
            for row in reader.deserialize() {
                let record: TimeseriesRecord = row?;
                record.validate_length()?;
                records.push(record);
            }
            Ok(records)
        }
        TimeseriesShape::Unstacked => {
            let frame = frame_from_reader(&headers, &mut reader)?;
            stack_records(&frame, "")
        }
    }
}

/// Write stacked records with the full time-series header.
pub fn save_timeseries(records: &[TimeseriesRecord], path: impl AsRef<Path>) -> EdpResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    debug!(path = %path.display(), rows = records.len(), "saving time series");
    write_timeseries(records, File::create(path)?)
}

pub fn write_timeseries<W: Write>(records: &[TimeseriesRecord], output: W) -> EdpResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(TIMESERIES_HEADER.full)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a column-wise file: datetime first column, one numeric column per series.
pub fn load_unstacked(path: impl AsRef<Path>) -> EdpResult<UnstackedFrame> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading unstacked time series");
    read_unstacked(File::open(path)?)
}

pub fn read_unstacked<R: Read>(input: R) -> EdpResult<UnstackedFrame> {
    let mut reader = reader_builder().from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    frame_from_reader(&headers, &mut reader)
}

fn frame_from_reader<R: Read>(
    headers: &[String],
    reader: &mut csv::Reader<R>,
) -> EdpResult<UnstackedFrame> {
    if headers.len() < 2 {
        return Err(EdpError::Validation(
            "unstacked time series need a datetime column and at least one series column".into(),
        ));
    }
    let names = &headers[1..];
    let mut index = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let stamp = row.get(0).unwrap_or_default();
        index.push(parse_datetime(stamp).map_err(|err| {
            EdpError::Parse(format!("row {}: {err}", line + 1))
        })?);
        for (pos, values) in columns.iter_mut().enumerate() {
            let cell = row.get(pos + 1).unwrap_or_default().trim();
            values.push(parse_cell(cell, &names[pos])?);
        }
    }

    let mut frame = UnstackedFrame::new(index)?;
    for (name, values) in names.iter().zip(columns) {
        frame.push_column(name.clone(), values)?;
    }
    Ok(frame)
}

fn parse_cell(cell: &str, column: &str) -> EdpResult<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|err| EdpError::Parse(format!("column '{column}': invalid value '{cell}': {err}")))
}

/// Write a column-wise frame under a `timeindex` header.
pub fn save_unstacked(frame: &UnstackedFrame, path: impl AsRef<Path>) -> EdpResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "saving unstacked time series"
    );
    write_unstacked(frame, File::create(path)?)
}

pub fn write_unstacked<W: Write>(frame: &UnstackedFrame, output: W) -> EdpResult<()> {
    let names = frame.column_names();
    let columns = names
        .iter()
        .map(|name| frame.values(name))
        .collect::<EdpResult<Vec<_>>>()?;
    let mut writer = csv::Writer::from_writer(output);
    let mut header = vec![INDEX_COLUMN];
    header.extend(names.iter().copied());
    writer.write_record(&header)?;
    for (row, stamp) in frame.index()?.iter().enumerate() {
        let mut cells = Vec::with_capacity(columns.len() + 1);
        cells.push(format_datetime(stamp));
        cells.extend(columns.iter().map(|values| format_value(values[row])));
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}
