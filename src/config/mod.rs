// src/config/mod.rs

//! Plan files for taskdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file from disk (`loader.rs`).
//! - Validate the whole plan up front and compute an insertion order in
//!   which every task's dependencies are admitted before it (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{DefaultSection, PlanFile, RawPlanFile, TaskConfig};
pub use validate::parse_deadline;
