//! # Domain Module
//!
//! Business rules for food waste tracking, independent of storage and UI.
//!
//! ## Module Organization
//!
//! - **entry_service**: the two-phase recording lifecycle (initial weight,
//!   then remaining weight)
//! - **waste**: waste percentage and severity, derived on every read
//! - **query**: search and column sorting over a set of entries
//! - **entry_table**: display formatting for the entry table
//! - **models**: lifecycle errors and input validation
//!
//! ## Business Rules
//!
//! - Weights are finite, non-negative kilograms
//! - Food item and meal type must not be blank
//! - Waste percentage is undefined until the remaining weight is recorded,
//!   and for entries weighed in at zero
//! - Waste percentage is never stored

pub mod entry_service;
pub mod entry_table;
pub mod models;
pub mod query;
pub mod waste;

pub use entry_service::*;
pub use entry_table::*;
pub use models::*;
pub use query::SortState;
