use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use edp_core::{EdpError, EdpResult, RecordKind, ScalarRecord};
use tracing::debug;

/// Column holding the new values in an update file.
pub const UPDATE_VALUE_COLUMN: &str = "var_value";

/// Scalar values keyed by two dimension columns, e.g. `(name, var_name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarUpdates {
    pub key_columns: [String; 2],
    pub rows: Vec<ScalarUpdate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarUpdate {
    pub key: [String; 2],
    pub var_value: Option<f64>,
}

/// Load an update file whose first two columns form the key.
pub fn load_updates(path: impl AsRef<Path>) -> EdpResult<ScalarUpdates> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading scalar updates");
    read_updates(File::open(path)?)
}

pub fn read_updates<R: Read>(input: R) -> EdpResult<ScalarUpdates> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);
    let headers = reader.headers()?.clone();
    if headers.len() < 3 {
        return Err(EdpError::Validation(
            "update files need two key columns and a var_value column".into(),
        ));
    }
    let key_columns = [headers[0].to_string(), headers[1].to_string()];
    for column in &key_columns {
        if ScalarRecord::default().dimension(column).is_none() {
            return Err(EdpError::UnknownColumn(column.clone()));
        }
    }
    let value_pos = headers
        .iter()
        .position(|h| h == UPDATE_VALUE_COLUMN)
        .ok_or_else(|| EdpError::MissingColumns {
            kind: RecordKind::Scalars,
            columns: vec![UPDATE_VALUE_COLUMN.to_string()],
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = record.get(value_pos).unwrap_or_default().trim();
        let var_value = if cell.is_empty() {
            None
        } else {
            Some(cell.parse::<f64>().map_err(|err| {
                EdpError::Parse(format!("invalid var_value '{cell}': {err}"))
            })?)
        };
        rows.push(ScalarUpdate {
            key: [
                record.get(0).unwrap_or_default().to_string(),
                record.get(1).unwrap_or_default().to_string(),
            ],
            var_value,
        });
    }
    Ok(ScalarUpdates { key_columns, rows })
}

fn key_of(record: &ScalarRecord, columns: &[String; 2]) -> [String; 2] {
    [
        record.dimension(&columns[0]).unwrap_or_default().to_string(),
        record.dimension(&columns[1]).unwrap_or_default().to_string(),
    ]
}

/// Write update values into `target`, refusing anything that would lose data.
///
/// Every update key must already exist in `target`, and a value may only be
/// written where `target` has none. Empty update values are skipped. Nothing
/// is modified unless all checks pass. Returns the number of rows written.
pub fn update_with_checks(target: &mut [ScalarRecord], updates: &ScalarUpdates) -> EdpResult<usize> {
    let columns = &updates.key_columns;
    let known: HashSet<[String; 2]> = target.iter().map(|r| key_of(r, columns)).collect();

    let unknown: Vec<String> = updates
        .rows
        .iter()
        .filter(|u| !known.contains(&u.key))
        .map(|u| format!("({}, {})", u.key[0], u.key[1]))
        .collect();
    if !unknown.is_empty() {
        return Err(EdpError::InconsistentUpdate(format!(
            "index of new data is not in the index of old data: {}",
            unknown.join(", ")
        )));
    }

    let pending: Vec<&ScalarUpdate> = updates
        .rows
        .iter()
        .filter(|u| u.var_value.is_some())
        .collect();
    let overwritten: Vec<String> = pending
        .iter()
        .filter(|u| {
            target
                .iter()
                .any(|r| r.var_value.is_some() && key_of(r, columns) == u.key)
        })
        .map(|u| format!("({}, {})", u.key[0], u.key[1]))
        .collect();
    if !overwritten.is_empty() {
        return Err(EdpError::InconsistentUpdate(format!(
            "update would overwrite existing data: {}",
            overwritten.join(", ")
        )));
    }

    let mut written = 0;
    for update in pending {
        for record in target.iter_mut() {
            if key_of(record, columns) == update.key {
                record.var_value = update.var_value;
                written += 1;
            }
        }
    }
    debug!(written, "applied scalar updates");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Vec<ScalarRecord> {
        let row = |name: &str, var_name: &str, value: Option<f64>| ScalarRecord {
            scenario: "base".into(),
            name: name.into(),
            var_name: var_name.into(),
            carrier: "electricity".into(),
            region: "BE".into(),
            tech: "ccgt".into(),
            kind: "conversion".into(),
            var_value: value,
            ..ScalarRecord::default()
        };
        vec![
            row("BE-ccgt", "capacity", None),
            row("BE-ccgt", "efficiency", Some(0.6)),
            row("BE-pv", "capacity", None),
        ]
    }

    const UPDATES: &str = "\
name,var_name,var_value
BE-ccgt,capacity,1200
BE-pv,capacity,
";

    #[test]
    fn reads_update_file() {
        let updates = read_updates(UPDATES.as_bytes()).unwrap();
        assert_eq!(updates.key_columns, ["name".to_string(), "var_name".to_string()]);
        assert_eq!(updates.rows.len(), 2);
        assert_eq!(updates.rows[0].var_value, Some(1200.0));
        assert_eq!(updates.rows[1].var_value, None);
    }

    #[test]
    fn update_fills_empty_values() {
        let mut scalars = target();
        let updates = read_updates(UPDATES.as_bytes()).unwrap();
        assert_eq!(update_with_checks(&mut scalars, &updates).unwrap(), 1);
        assert_eq!(scalars[0].var_value, Some(1200.0));
        assert_eq!(scalars[2].var_value, None);
    }

    #[test]
    fn unknown_key_is_refused() {
        let mut scalars = target();
        let updates = read_updates("name,var_name,var_value\nBB-wind,capacity,5\n".as_bytes()).unwrap();
        let err = update_with_checks(&mut scalars, &updates).unwrap_err();
        assert!(matches!(err, EdpError::InconsistentUpdate(_)));
        assert!(err.to_string().contains("(BB-wind, capacity)"));
    }

    #[test]
    fn overwrite_is_refused_without_partial_writes() {
        let mut scalars = target();
        let text = "name,var_name,var_value\nBE-ccgt,capacity,1200\nBE-ccgt,efficiency,0.5\n";
        let updates = read_updates(text.as_bytes()).unwrap();
        let err = update_with_checks(&mut scalars, &updates).unwrap_err();
        assert!(err.to_string().contains("overwrite existing data"));
        assert_eq!(scalars, target());
    }

    #[test]
    fn update_file_needs_value_column() {
        let err = read_updates("name,var_name,value\na,b,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EdpError::MissingColumns { .. }));
        let err = read_updates("colour,var_name,var_value\na,b,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EdpError::UnknownColumn(_)));
    }
}
