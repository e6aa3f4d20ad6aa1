use std::path::Path;

use anyhow::{Context, Result};
use edp_io::{load_scalars, save_scalars};
use edp_scenarios::{load_spec_from_path, load_updates, update_with_checks};
use tracing::info;

pub fn handle(spec: &Path, scalars: &Path) -> Result<()> {
    let spec = load_spec_from_path(spec)?;
    info!(
        "Parametrizing {} with scenario {}",
        scalars.display(),
        spec.display_name()
    );
    let updates = load_updates(&spec.path_scalars)
        .with_context(|| format!("loading updates '{}'", spec.path_scalars.display()))?;
    let mut records = load_scalars(scalars)
        .with_context(|| format!("loading '{}'", scalars.display()))?;
    let written = update_with_checks(&mut records, &updates)?;
    save_scalars(&records, scalars)?;
    println!(
        "Updated {written} values in {} from scenario {}",
        scalars.display(),
        spec.display_name()
    );
    Ok(())
}
