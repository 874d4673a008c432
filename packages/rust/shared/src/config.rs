//! Application configuration for docsplit.
//!
//! User config lives at `~/.docsplit/docsplit.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocsplitError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docsplit.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docsplit";

// ---------------------------------------------------------------------------
// Config structs (matching docsplit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Archive and naming settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Presentation template for rendered sections.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Download name used when a job carries no label.
    #[serde(default = "default_archive_file_name")]
    pub archive_file_name: String,

    /// File name for content that precedes the first heading.
    #[serde(default = "default_fallback_file_name")]
    pub fallback_file_name: String,

    /// Substitute for headings that sanitize to nothing.
    #[serde(default = "default_placeholder_name")]
    pub placeholder_name: String,

    /// Output document format: "docx" or "html".
    #[serde(default = "default_format")]
    pub format: String,

    /// Ignore heading-like lines inside fenced code blocks.
    #[serde(default)]
    pub skip_fenced_code: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_file_name: default_archive_file_name(),
            fallback_file_name: default_fallback_file_name(),
            placeholder_name: default_placeholder_name(),
            format: default_format(),
            skip_fenced_code: false,
        }
    }
}

fn default_archive_file_name() -> String {
    "Requirements_Export.zip".into()
}
fn default_fallback_file_name() -> String {
    "General_Info".into()
}
fn default_placeholder_name() -> String {
    "Untitled_Section".into()
}
fn default_format() -> String {
    "docx".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// CSS font stack for body text.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Body font size in points.
    #[serde(default = "default_font_size")]
    pub font_size_pt: u32,

    /// CSS color for all heading levels.
    #[serde(default = "default_heading_color")]
    pub heading_color: String,

    /// CSS color for table cell borders.
    #[serde(default = "default_border_color")]
    pub table_border_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size_pt: default_font_size(),
            heading_color: default_heading_color(),
            table_border_color: default_border_color(),
        }
    }
}

fn default_font_family() -> String {
    "Calibri, Arial, sans-serif".into()
}
fn default_font_size() -> u32 {
    11
}
fn default_heading_color() -> String {
    "#1F3864".into()
}
fn default_border_color() -> String {
    "#999999".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docsplit/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocsplitError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docsplit/docsplit.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsplitError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocsplitError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocsplitError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsplitError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocsplitError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
