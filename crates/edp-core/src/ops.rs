//! Table utilities over loaded records: membership filtering, dimension
//! aggregation and the var_name pivot used for result tables.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use polars_ops::pivot::{pivot_stable, PivotAgg};
use polars::prelude::*;

use crate::error::{EdpError, EdpResult};
use crate::frame::{f64_column, scalars_frame, utf8_column, UNIT_COLUMN, VALUE_COLUMN};
use crate::records::{Record, ScalarRecord};

/// Dimension columns that identify a scalar fact when aggregating.
pub const SCALAR_DIMENSIONS: &[&str] = &["scenario", "carrier", "region", "tech", "type", "var_name"];

/// Label written into aggregated-away dimensions.
pub const AGGREGATED_LABEL: &str = "ALL";

/// Columns compared as numbers when filtering, so `1200` matches `1200.0`.
const NUMERIC_COLUMNS: &[&str] = &["id_scal", "id_ts", "var_value"];

const UNIT_COUNT: &str = "unit_count";

/// Keep rows whose `column` value is in `allowed`.
///
/// Numeric columns match by value rather than by spelling.
pub fn filter_records<R, S>(records: &[R], column: &str, allowed: &[S]) -> EdpResult<Vec<R>>
where
    R: Record + Clone,
    S: AsRef<str>,
{
    if !R::KIND.header().contains(column) {
        return Err(EdpError::UnknownColumn(column.to_string()));
    }
    let mut kept = Vec::new();
    if NUMERIC_COLUMNS.contains(&column) {
        let allowed = allowed
            .iter()
            .map(|s| {
                let s = s.as_ref().trim();
                s.parse::<f64>()
                    .map_err(|err| EdpError::Parse(format!("{column} filter value '{s}': {err}")))
            })
            .collect::<EdpResult<Vec<f64>>>()?;
        for record in records {
            let value = record.value(column)?.and_then(|cell| cell.parse::<f64>().ok());
            if value.is_some_and(|v| allowed.contains(&v)) {
                kept.push(record.clone());
            }
        }
        return Ok(kept);
    }

    let allowed: HashSet<&str> = allowed.iter().map(|s| s.as_ref()).collect();
    for record in records {
        if let Some(value) = record.value(column)? {
            if allowed.contains(value.as_str()) {
                kept.push(record.clone());
            }
        }
    }
    Ok(kept)
}

/// Reduction applied to `var_value` within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationMethod {
    #[default]
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

impl FromStr for AggregationMethod {
    type Err = EdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(AggregationMethod::Sum),
            "mean" => Ok(AggregationMethod::Mean),
            "min" => Ok(AggregationMethod::Min),
            "max" => Ok(AggregationMethod::Max),
            "count" => Ok(AggregationMethod::Count),
            other => Err(EdpError::InvalidArgument(format!(
                "unsupported aggregation '{other}'; use sum, mean, min, max, or count"
            ))),
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationMethod::Sum => "sum",
            AggregationMethod::Mean => "mean",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::Count => "count",
        };
        f.write_str(name)
    }
}

impl AggregationMethod {
    fn expr(self) -> Expr {
        let value = col(VALUE_COLUMN);
        match self {
            AggregationMethod::Sum => value.sum().fill_null(lit(0.0)),
            AggregationMethod::Mean => value.mean(),
            AggregationMethod::Min => value.min(),
            AggregationMethod::Max => value.max(),
            AggregationMethod::Count => value.drop_nulls().count().cast(DataType::Float64),
        }
    }
}

/// Collapse `columns_to_aggregate` out of a scalar table.
///
/// Rows are grouped by the remaining [`SCALAR_DIMENSIONS`] with a polars
/// group-by; groups come out in sorted key order. Aggregated dimensions read
/// [`AGGREGATED_LABEL`], `name` reads `None` and the unit survives only when
/// the whole group agrees on it. Empty values are skipped, so `sum` of an
/// all-empty group is 0 and `mean`, `min`, `max` are empty.
pub fn aggregate_scalars<S: AsRef<str>>(
    records: &[ScalarRecord],
    columns_to_aggregate: &[S],
    method: AggregationMethod,
) -> EdpResult<Vec<ScalarRecord>> {
    let aggregated: Vec<&str> = columns_to_aggregate.iter().map(|c| c.as_ref()).collect();
    if let Some(bad) = aggregated.iter().find(|c| !SCALAR_DIMENSIONS.contains(*c)) {
        return Err(EdpError::InvalidArgument(format!(
            "cannot aggregate over '{bad}'; choose from {}",
            SCALAR_DIMENSIONS.join(", ")
        )));
    }
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let group_columns: Vec<&str> = SCALAR_DIMENSIONS
        .iter()
        .copied()
        .filter(|c| !aggregated.contains(c))
        .collect();

    let exprs = [
        method.expr().alias(VALUE_COLUMN),
        col(UNIT_COLUMN).n_unique().alias(UNIT_COUNT),
        col(UNIT_COLUMN).first().alias(UNIT_COLUMN),
    ];
    let frame = scalars_frame(records)?
        .lazy()
        .with_column(col(UNIT_COLUMN).fill_null(lit("")));
    let grouped = if group_columns.is_empty() {
        frame.select(exprs)
    } else {
        let keys: Vec<Expr> = group_columns.iter().map(|c| col(c)).collect();
        frame.group_by(keys).agg(exprs)
    }
    .collect()?;

    let keys = group_columns
        .iter()
        .map(|c| utf8_column(&grouped, c))
        .collect::<EdpResult<Vec<_>>>()?;
    let values = f64_column(&grouped, VALUE_COLUMN)?;
    let unit_counts = f64_column(&grouped, UNIT_COUNT)?;
    let units = utf8_column(&grouped, UNIT_COLUMN)?;

    let mut out = Vec::with_capacity(grouped.height());
    for row in 0..grouped.height() {
        let key: Vec<String> = keys.iter().map(|column| column[row].clone()).collect();
        let uniform = unit_counts[row] == Some(1.0) && !units[row].is_empty();
        let mut record = ScalarRecord {
            name: "None".to_string(),
            var_value: values[row],
            var_unit: uniform.then(|| units[row].clone()),
            ..ScalarRecord::default()
        };
        for (column, value) in group_columns.iter().zip(&key) {
            record.set_dimension(column, value)?;
        }
        for column in &aggregated {
            record.set_dimension(column, AGGREGATED_LABEL)?;
        }
        out.push((key, record));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out.into_iter().map(|(_, record)| record).collect())
}

/// Scalar values spread into one column per var_name.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub index_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub key: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl PivotTable {
    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.value_columns.iter().position(|c| c == column)
    }

    /// Remove index columns from the table; the remaining key columns keep their order.
    pub fn drop_index_columns(&mut self, columns: &[&str]) {
        let keep: Vec<bool> = self
            .index_columns
            .iter()
            .map(|c| !columns.contains(&c.as_str()))
            .collect();
        let retain = |values: &mut Vec<String>| {
            let mut flags = keep.iter();
            values.retain(|_| *flags.next().unwrap_or(&true));
        };
        retain(&mut self.index_columns);
        for row in &mut self.rows {
            retain(&mut row.key);
        }
    }

    /// Keep rows that hold a value in `column`; a missing column keeps nothing.
    pub fn retain_present(&mut self, column: &str) {
        match self.column_position(column) {
            Some(pos) => self.rows.retain(|row| row.values[pos].is_some()),
            None => self.rows.clear(),
        }
    }
}

/// Pivot `var_value` by `var_name` over the `index` dimension columns.
///
/// Value columns and rows come out sorted. Two records landing in the same
/// cell is an error.
pub fn pivot_scalars<S: AsRef<str>>(records: &[ScalarRecord], index: &[S]) -> EdpResult<PivotTable> {
    let index_columns: Vec<String> = index.iter().map(|c| c.as_ref().to_string()).collect();
    if index_columns.is_empty() {
        return Err(EdpError::InvalidArgument(
            "a var_name pivot needs at least one index column".into(),
        ));
    }
    if let Some(bad) = index_columns.iter().find(|c| {
        c.as_str() == "var_name" || (!SCALAR_DIMENSIONS.contains(&c.as_str()) && c.as_str() != "name")
    }) {
        return Err(EdpError::InvalidArgument(format!(
            "'{bad}' cannot index a var_name pivot"
        )));
    }

    let mut filled = HashSet::new();
    for record in records {
        let key: Vec<&str> = index_columns
            .iter()
            .map(|c| record.dimension(c).unwrap_or_default())
            .collect();
        if !filled.insert((key.clone(), record.var_name.as_str())) {
            return Err(EdpError::Validation(format!(
                "duplicate entry for ({}) and var_name '{}'",
                key.join(", "),
                record.var_name
            )));
        }
    }
    if records.is_empty() {
        return Ok(PivotTable {
            index_columns,
            value_columns: Vec::new(),
            rows: Vec::new(),
        });
    }

    let wide = pivot_stable(
        &scalars_frame(records)?,
        [VALUE_COLUMN],
        &index_columns,
        ["var_name"],
        true,
        Some(PivotAgg::First),
        None,
    )?;
    let value_columns: Vec<String> = wide
        .get_column_names()
        .into_iter()
        .skip(index_columns.len())
        .map(String::from)
        .collect();

    let keys = index_columns
        .iter()
        .map(|c| utf8_column(&wide, c))
        .collect::<EdpResult<Vec<_>>>()?;
    let values = value_columns
        .iter()
        .map(|c| f64_column(&wide, c))
        .collect::<EdpResult<Vec<_>>>()?;
    let mut rows: Vec<PivotRow> = (0..wide.height())
        .map(|row| PivotRow {
            key: keys.iter().map(|column| column[row].clone()).collect(),
            values: values.iter().map(|column| column[row]).collect(),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(PivotTable {
        index_columns,
        value_columns,
        rows,
    })
}
