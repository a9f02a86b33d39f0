//! # Trade Table Accessor
//!
//! Loads the consolidated bilateral trade extract into typed `TradeRecord`s and
//! exposes the read-only projections every metric is built from.
//!
//! ## Reading direction
//!
//! Each row is expressed from the reporter's side. "The subject imports from X"
//! is therefore read off rows where the subject is the *partner*, the flow is
//! `Export` and X is the reporter. That inversion lives in `TradeTable` and
//! nowhere else.
//!
//! ## Public API
//!
//! - `TradeTable`: the immutable, year-indexed record set and its views.
//! - `LoadOptions` / `LoadReport`: ingestion knobs and the rejection summary.
//! - `PartnerShareMap`: partner -> percentage share of the subject's imports.
//! - `ProductMatch`: exact or prefix product-code filtering.

pub mod error;
pub mod loader;
pub mod shares;
pub mod table;

pub use error::TableError;
pub use loader::{LoadOptions, LoadReport};
pub use shares::PartnerShareMap;
pub use core_types::ProductMatch;
pub use table::TradeTable;
