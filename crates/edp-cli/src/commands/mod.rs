pub mod parametrize;
pub mod scalars;
pub mod schema;
pub mod tables;
pub mod ts;
pub mod util;
