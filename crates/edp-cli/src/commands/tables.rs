use std::path::Path;

use anyhow::{Context, Result};
use edp_core::{filter_records, pivot_scalars, ScalarRecord};
use edp_io::{load_scalars, save_pivot, save_projection};
use tracing::info;

const SINK_TYPES: &[&str] = &["excess", "load"];
const SINK_COLUMNS: &[&str] = &["region", "carrier", "tech", "var_name", "var_value"];
const PIVOT_INDEX: &[&str] = &["scenario", "name", "region", "carrier", "tech", "type"];

pub fn handle(input: &Path, output: &Path, carrier: &str) -> Result<()> {
    let source = input.join("scalars.csv");
    info!("Building result tables from {}", source.display());
    let scalars = load_scalars(&source)
        .with_context(|| format!("loading '{}'", source.display()))?;

    let production = production_var_names(carrier);
    let selected = filter_records(&scalars, "var_name", &production)?;
    let mut table = pivot_scalars(&selected, PIVOT_INDEX)?;
    table.retain_present(&format!("flow_out_{carrier}"));
    table.drop_index_columns(&["scenario", "name", "type"]);
    let production_path = output.join("production_table.csv");
    save_pivot(&table, &production_path)?;

    let sinks: Vec<ScalarRecord> = scalars
        .iter()
        .filter(|r| r.var_name.contains("flow_in_") && SINK_TYPES.contains(&r.kind.as_str()))
        .cloned()
        .collect();
    let sink_path = output.join("sink_table.csv");
    save_projection(&sinks, SINK_COLUMNS, &sink_path)?;

    println!(
        "Wrote {} production rows to {} and {} sink rows to {}",
        table.rows.len(),
        production_path.display(),
        sinks.len(),
        sink_path.display()
    );
    Ok(())
}

fn production_var_names(carrier: &str) -> Vec<String> {
    vec![
        "capacity".to_string(),
        format!("invest_out_{carrier}"),
        format!("flow_out_{carrier}"),
        "storage_capacity".to_string(),
        "invest".to_string(),
        "loss".to_string(),
    ]
}
