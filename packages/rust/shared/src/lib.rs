//! Shared types, error model, and configuration for plantpresets.
//!
//! This crate is the foundation depended on by all other plantpresets crates.
//! It provides:
//! - [`PresetsError`], the unified error type
//! - Domain types ([`ItemStyle`], [`TableSource`], schema constants)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ArchiveConfig, CONFIG_FILE_NAME, OutputConfig, PresetsConfig, init_config,
    init_config_at, load_config, load_config_from, resolve_path,
};
pub use error::{PresetsError, Result};
pub use types::{ItemStyle, PRESET_NAMESPACE, TableSource, VERSION_ENV};
