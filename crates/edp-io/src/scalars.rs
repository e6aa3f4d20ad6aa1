use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use edp_core::{EdpResult, RecordKind, ScalarRecord, SCALARS_HEADER};
use tracing::debug;

use crate::{ensure_parent_dir, reader_builder};

/// Load a scalars file, failing if any required column is absent.
pub fn load_scalars(path: impl AsRef<Path>) -> EdpResult<Vec<ScalarRecord>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading scalars");
    read_scalars(File::open(path)?)
}

pub fn read_scalars<R: Read>(input: R) -> EdpResult<Vec<ScalarRecord>> {
    let mut reader = reader_builder().from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    SCALARS_HEADER.check_required(RecordKind::Scalars, &headers)?;

    let absent: Vec<&str> = SCALARS_HEADER
        .optional
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h.as_str() == *column))
        .collect();
    if !absent.is_empty() {
        debug!(columns = ?absent, "filling absent optional scalar columns");
    }
    let extra: Vec<&String> = headers
        .iter()
        .filter(|h| !SCALARS_HEADER.contains(h))
        .collect();
    if !extra.is_empty() {
        debug!(columns = ?extra, "ignoring columns outside the scalars schema");
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Write scalars with the full header, creating parent directories.
pub fn save_scalars(records: &[ScalarRecord], path: impl AsRef<Path>) -> EdpResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    debug!(path = %path.display(), rows = records.len(), "saving scalars");
    write_scalars(records, File::create(path)?)
}

pub fn write_scalars<W: Write>(records: &[ScalarRecord], output: W) -> EdpResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(SCALARS_HEADER.full)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edp_core::EdpError;
    use tempfile::tempdir;

    const FULL: &str = "\
id_scal,scenario,name,var_name,carrier,region,tech,type,var_value,var_unit,reference,comment
1,base,BE-ccgt,capacity,gas,BE,ccgt,conversion,1200.5,MW,dataset A,
2,base,BE-pv,capacity,solar,BE,pv,volatile,300,MW,,rooftop only
";

    const REQUIRED_ONLY: &str = "\
scenario,name,var_name,carrier,region,tech,type,var_value
base,BB-wind,capacity,wind,BB,onshore,volatile,7000
base,BB-wind,marginal_cost,wind,BB,onshore,volatile,
";

    const MISSING_REGION: &str = "\
scenario,name,var_name,carrier,tech,type,var_value
base,BB-wind,capacity,wind,onshore,volatile,7000
";

    #[test]
    fn reads_full_header() {
        let records = read_scalars(FULL.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id_scal, Some(1));
        assert_eq!(records[0].kind, "conversion");
        assert_eq!(records[0].var_value, Some(1200.5));
        assert_eq!(records[0].reference.as_deref(), Some("dataset A"));
        assert_eq!(records[0].comment, None);
        assert_eq!(records[1].comment.as_deref(), Some("rooftop only"));
    }

    #[test]
    fn tolerates_missing_optional_columns() {
        let records = read_scalars(REQUIRED_ONLY.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id_scal, None);
        assert_eq!(records[0].var_unit, None);
        assert_eq!(records[1].var_value, None);
    }

    #[test]
    fn missing_region_is_reported() {
        match read_scalars(MISSING_REGION.as_bytes()) {
            Err(EdpError::MissingColumns { kind, columns }) => {
                assert_eq!(kind, RecordKind::Scalars);
                assert_eq!(columns, vec!["region".to_string()]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scalars.csv");
        let records = read_scalars(FULL.as_bytes()).unwrap();
        save_scalars(&records, &path).unwrap();
        assert!(path.exists());
        assert_eq!(load_scalars(&path).unwrap(), records);

        let partial = read_scalars(REQUIRED_ONLY.as_bytes()).unwrap();
        save_scalars(&partial, &path).unwrap();
        assert_eq!(load_scalars(&path).unwrap(), partial);
    }

    #[test]
    fn empty_table_keeps_header() {
        let mut out = Vec::new();
        write_scalars(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), SCALARS_HEADER.full.join(","));
        assert!(read_scalars(text.as_bytes()).unwrap().is_empty());
    }
}
