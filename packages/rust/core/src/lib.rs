//! Pipeline orchestration for plantpresets.
//!
//! This crate ties together table loading, taxon parsing, preset emission,
//! serialization and packaging into the end-to-end `generate` workflow.

pub mod package;
pub mod pipeline;
pub mod table;
