//! Shared types, error model, and configuration for docsplit.
//!
//! This crate is the foundation depended on by all other docsplit crates.
//! It provides:
//! - [`DocsplitError`]: the unified error type
//! - Domain types ([`Section`], [`HeadingLevel`], [`JobId`])
//! - Configuration ([`AppConfig`], [`ExportConfig`], [`RenderConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExportConfig, RenderConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{DocsplitError, Result};
pub use types::{HeadingLevel, JobId, Section};
