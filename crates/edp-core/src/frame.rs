//! Conversions between scalar records and polars frames.

use polars::prelude::*;

use crate::error::EdpResult;
use crate::ops::SCALAR_DIMENSIONS;
use crate::records::ScalarRecord;

pub const VALUE_COLUMN: &str = "var_value";
pub const UNIT_COLUMN: &str = "var_unit";

/// Frame with `name`, every dimension, `var_value` and `var_unit`.
///
/// NaN values become nulls so polars reductions skip them.
pub fn scalars_frame(records: &[ScalarRecord]) -> EdpResult<DataFrame> {
    let mut columns = Vec::with_capacity(SCALAR_DIMENSIONS.len() + 3);
    for column in std::iter::once(&"name").chain(SCALAR_DIMENSIONS) {
        let cells: Vec<&str> = records
            .iter()
            .map(|r| r.dimension(column).unwrap_or_default())
            .collect();
        columns.push(Series::new(column, cells));
    }
    let values: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.var_value.filter(|v| !v.is_nan()))
        .collect();
    columns.push(Series::new(VALUE_COLUMN, values));
    let units: Vec<Option<&str>> = records.iter().map(|r| r.var_unit.as_deref()).collect();
    columns.push(Series::new(UNIT_COLUMN, units));
    Ok(DataFrame::new(columns)?)
}

/// Text cells of `column`; nulls read as empty strings.
pub fn utf8_column(df: &DataFrame, column: &str) -> EdpResult<Vec<String>> {
    let cells = df
        .column(column)?
        .utf8()?
        .into_iter()
        .map(|cell| cell.unwrap_or_default().to_string())
        .collect();
    Ok(cells)
}

/// Numeric cells of `column` cast to `f64`.
pub fn f64_column(df: &DataFrame, column: &str) -> EdpResult<Vec<Option<f64>>> {
    let series = df.column(column)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_holds_every_dimension() {
        let records = vec![
            ScalarRecord {
                name: "BE-ccgt".into(),
                region: "BE".into(),
                kind: "conversion".into(),
                var_value: Some(f64::NAN),
                ..ScalarRecord::default()
            },
            ScalarRecord {
                name: "BE-pv".into(),
                var_value: Some(4.0),
                var_unit: Some("MW".into()),
                ..ScalarRecord::default()
            },
        ];
        let df = scalars_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), SCALAR_DIMENSIONS.len() + 3);
        assert_eq!(utf8_column(&df, "type").unwrap(), vec!["conversion", ""]);
        assert_eq!(f64_column(&df, VALUE_COLUMN).unwrap(), vec![None, Some(4.0)]);
        assert_eq!(utf8_column(&df, UNIT_COLUMN).unwrap(), vec!["", "MW"]);
    }
}
