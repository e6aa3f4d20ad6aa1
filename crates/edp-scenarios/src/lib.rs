pub mod spec;
pub mod update;

pub use spec::{load_spec_from_path, validate, ScenarioSpec};
pub use update::{
    load_updates, read_updates, update_with_checks, ScalarUpdate, ScalarUpdates,
    UPDATE_VALUE_COLUMN,
};
