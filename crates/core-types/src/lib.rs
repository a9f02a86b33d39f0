pub mod codes;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use codes::{ProductCode, ProductMatch, normalize_iso3, strip_zero_fraction};
pub use enums::{FlowDirection, Period, Region};
pub use error::CoreError;
pub use structs::{Metric, MetricResult, TradeRecord};
