//! # Derisk Metrics Engine
//!
//! This crate turns a `TradeTable` into the seven de-risking indices:
//! dependency, concentration, diversification, substitution, sector
//! vulnerability, balance improvement and resilience.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O. The engine reads only the table it is handed.
//! - **Stateless Calculation:** `MetricsEngine` holds immutable reference data
//!   (region map, partner lists) injected at construction. Each calculator is
//!   a function of `(table, year, parameters)`.
//! - **No Failure Paths:** An empty scope or zero denominator yields
//!   `Metric::no_data()`, whose value is `0.0`, instead of an error.
//!
//! ## Public API
//!
//! - `MetricsEngine` / `EngineParams`: the calculators and their bounds.
//! - `ReferenceData` / `RegionMap`: the injected constant tables.
//! - `ResilienceWeights` / `ResilienceBreakdown`: resilience inputs and output.
//! - `MetricsError`: invalid engine parameters.

// Declare the modules that constitute this crate.
pub mod balance;
pub mod diversification;
pub mod engine;
pub mod error;
pub mod product;
pub mod reference;
pub mod resilience;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{EngineParams, MetricsEngine, YearSnapshot};
pub use error::MetricsError;
pub use reference::{DEFAULT_ALTERNATIVE_PARTNERS, DEFAULT_PRIMARY_PARTNER, ReferenceData, RegionMap};
pub use resilience::{ResilienceBreakdown, ResilienceWeights};
