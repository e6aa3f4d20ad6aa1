//! # edp-core: Energy Data Package Core
//!
//! Schema definitions, record types and table utilities shared by the data
//! package tools.
//!
//! ## Design Philosophy
//!
//! Data packages hold two record kinds:
//! - **Scalars**: one fact per row (`scenario`, `name`, `var_name`, dimensions, `var_value`)
//! - **Time series**: one series per row, stacked with its datetime bounds and resolution
//!
//! Each kind has a static [`schema::Header`] listing every column in order and
//! the optional subset. Loaders check required columns against that header
//! before deserializing any row, so a malformed file is rejected with the exact
//! names of the missing columns.
//!
//! ## Quick Start
//!
//! ```rust
//! use edp_core::{optional_required_header, RecordKind};
//!
//! let (full, optional, required) = optional_required_header("scalars").unwrap();
//! assert_eq!(full.len(), optional.len() + required.len());
//! assert_eq!(RecordKind::Timeseries.header().full[0], "id_ts");
//! ```

pub mod error;
pub mod frame;
pub mod ops;
pub mod records;
pub mod schema;
pub mod series;
pub mod time;

pub use error::{EdpError, EdpResult};
pub use frame::{f64_column, scalars_frame, utf8_column};
pub use ops::{
    aggregate_scalars, filter_records, pivot_scalars, AggregationMethod, PivotRow, PivotTable,
    AGGREGATED_LABEL, SCALAR_DIMENSIONS,
};
pub use records::{Record, ScalarRecord, TimeseriesRecord};
pub use schema::{optional_required_header, Header, RecordKind, SCALARS_HEADER, TIMESERIES_HEADER};
pub use series::{decode_series, encode_series};
pub use time::{format_datetime, parse_datetime, Resolution, ResolutionUnit, TimeIndex};
