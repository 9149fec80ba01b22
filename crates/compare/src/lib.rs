//! `cubadiff-compare`: before/after table comparison engine.
//!
//! Pure engine crate: receives two already-parsed tables, returns aligned,
//! categorized cell changes plus a display copy of the new table.
//! No file parsing, no CLI, no rendering.

pub mod align;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod group;
pub mod model;
pub mod normalize;

pub use align::{align, AlignmentResult, FallbackReason, KeyScheme, RowKey};
pub use config::CompareConfig;
pub use engine::{compare, diff};
pub use error::CompareError;
pub use group::group_by_row;
pub use model::{Category, ChangeRecord, CompareReport, RowGroup, Table, Value};
