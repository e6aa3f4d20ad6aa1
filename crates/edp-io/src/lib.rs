//! # edp-io: Data Package File I/O
//!
//! Loaders and savers for the comma-separated files of an energy data package.
//!
//! ## Design Philosophy
//!
//! **Schema First**: headers are checked against the static schema of the
//! record kind before a single row is deserialized. A file missing required
//! columns fails with the full list of missing names; missing optional columns
//! are filled with empty values.
//!
//! **Lossless Roundtrips**: savers always write the full canonical header in
//! order, floats in their shortest exact form and series as bracketed list
//! literals, so `load(save(table)) == table`.
//!
//! **Shape Sniffing**: time series arrive stacked (one row per series) or
//! unstacked (one column per series). [`load_timeseries`] accepts both and
//! always returns canonical stacked records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edp_io::{load_scalars, save_scalars};
//!
//! fn main() -> edp_core::EdpResult<()> {
//!     let scalars = load_scalars("scenario/scalars.csv")?;
//!     save_scalars(&scalars, "out/scalars.csv")?;
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::Path;

use edp_core::EdpResult;

pub mod scalars;
pub mod tables;
pub mod timeseries;

pub use scalars::{load_scalars, read_scalars, save_scalars, write_scalars};
pub use tables::{save_pivot, save_projection};
pub use timeseries::{
    load_timeseries, load_unstacked, read_timeseries, read_unstacked, save_timeseries,
    save_unstacked, sniff_shape, write_timeseries, write_unstacked, TimeseriesShape,
};

/// Header cell written above the datetime axis of unstacked files.
pub use edp_ts::INDEX_COLUMN;

pub(crate) fn ensure_parent_dir(path: &Path) -> EdpResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub(crate) fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::Headers);
    builder
}

/// Format a cell value so it parses back to the same `f64`; NaN is an empty cell.
pub(crate) fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
