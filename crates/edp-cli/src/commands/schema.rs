use std::path::Path;

use anyhow::{Context, Result};
use edp_core::{optional_required_header, RecordKind};
use edp_io::{load_scalars, load_timeseries};
use tracing::info;

pub fn print_schema(kind: &str) -> Result<()> {
    let (full, optional, required) = optional_required_header(kind)?;
    println!("{kind} columns: {}", full.join(", "));
    println!("  required: {}", required.join(", "));
    println!("  optional: {}", optional.join(", "));
    Ok(())
}

pub fn validate(kind: &str, input: &Path) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let context = || format!("validating {kind} file '{}'", input.display());
    let rows = match kind {
        RecordKind::Scalars => load_scalars(input).with_context(context)?.len(),
        RecordKind::Timeseries => load_timeseries(input).with_context(context)?.len(),
    };
    info!(rows, "validated {}", input.display());
    println!("{} is a valid {kind} file ({rows} rows)", input.display());
    Ok(())
}
