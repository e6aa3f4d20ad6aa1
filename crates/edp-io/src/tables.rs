//! Writers for derived result tables whose columns are not a record schema.

use std::fs::File;
use std::path::Path;

use edp_core::{EdpError, EdpResult, PivotTable, Record};
use tracing::debug;

use crate::{ensure_parent_dir, format_value};

/// Write a pivot: index columns first, then one column per var_name.
pub fn save_pivot(table: &PivotTable, path: impl AsRef<Path>) -> EdpResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    debug!(path = %path.display(), rows = table.rows.len(), "saving pivot table");
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    let header: Vec<&str> = table
        .index_columns
        .iter()
        .chain(&table.value_columns)
        .map(String::as_str)
        .collect();
    writer.write_record(&header)?;
    for row in &table.rows {
        let cells: Vec<String> = row
            .key
            .iter()
            .cloned()
            .chain(
                row.values
                    .iter()
                    .map(|v| v.map(format_value).unwrap_or_default()),
            )
            .collect();
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write only `columns` of each record, in the given order.
pub fn save_projection<R: Record>(
    records: &[R],
    columns: &[&str],
    path: impl AsRef<Path>,
) -> EdpResult<()> {
    if let Some(bad) = columns.iter().find(|c| !R::KIND.header().contains(c)) {
        return Err(EdpError::UnknownColumn(bad.to_string()));
    }
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    debug!(path = %path.display(), rows = records.len(), ?columns, "saving projection");
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(columns)?;
    for record in records {
        let mut cells = Vec::with_capacity(columns.len());
        for column in columns {
            cells.push(record.value(column)?.unwrap_or_default());
        }
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edp_core::{pivot_scalars, ScalarRecord};
    use std::fs;
    use tempfile::tempdir;

    fn scalar(tech: &str, var_name: &str, value: f64) -> ScalarRecord {
        ScalarRecord {
            scenario: "base".into(),
            name: format!("BE-{tech}"),
            var_name: var_name.into(),
            carrier: "electricity".into(),
            region: "BE".into(),
            tech: tech.into(),
            kind: "conversion".into(),
            var_value: Some(value),
            ..ScalarRecord::default()
        }
    }

    #[test]
    fn pivot_file_has_index_then_values() {
        let records = vec![
            scalar("ccgt", "capacity", 10.0),
            scalar("ccgt", "invest", 2.5),
            scalar("pv", "capacity", 4.0),
        ];
        let table = pivot_scalars(&records, &["region", "tech"]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("tables").join("pivot.csv");
        save_pivot(&table, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "region,tech,capacity,invest");
        assert_eq!(lines[1], "BE,ccgt,10,2.5");
        assert_eq!(lines[2], "BE,pv,4,");
    }

    #[test]
    fn projection_keeps_requested_columns() {
        let records = vec![scalar("ccgt", "flow_in_electricity", 7.0)];
        let dir = tempdir().unwrap();
        let path = dir.path().join("sink.csv");
        save_projection(&records, &["tech", "var_name", "var_value"], &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "tech,var_name,var_value\nccgt,flow_in_electricity,7\n");

        assert!(matches!(
            save_projection(&records, &["colour"], &path),
            Err(EdpError::UnknownColumn(_))
        ));
    }
}
