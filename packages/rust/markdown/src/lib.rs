//! Markdown segmentation and per-section document rendering.
//!
//! Splits an AI-generated markdown document into heading-led sections, and
//! renders a single section into a standalone, styled document:
//! markdown → HTML fragment (`pulldown-cmark`) → templated HTML document →
//! target format (`.docx` package or plain `.html`).

mod docx;
mod sanitize;
mod segment;
mod template;

use std::str::FromStr;

use pulldown_cmark::{Options, Parser, html};
use tracing::{debug, instrument};

use docsplit_shared::{AppConfig, DocsplitError, Result};

pub use sanitize::{DEFAULT_PLACEHOLDER, ILLEGAL_NAME_CHARS, sanitize_name, sanitize_or};
pub use segment::{SegmentOptions, parse_heading, segment, segment_with};
pub use template::Template;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Binary document format produced for each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// Word document with the styled HTML embedded as an import chunk.
    #[default]
    Docx,
    /// The styled HTML document itself.
    Html,
}

impl RenderFormat {
    /// File extension (without the dot) for documents of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Html => "html",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = DocsplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "html" | "htm" => Ok(Self::Html),
            other => Err(DocsplitError::parse(format!(
                "unknown render format '{other}': expected 'docx' or 'html'"
            ))),
        }
    }
}

impl std::fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options for rendering one section.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Output format.
    pub format: RenderFormat,
    /// Presentation template.
    pub template: Template,
}

impl RenderOptions {
    /// Build render options from the application config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let format = config
            .export
            .format
            .parse()
            .map_err(|e: DocsplitError| DocsplitError::config(e.to_string()))?;
        Ok(Self {
            format,
            template: Template::from(&config.render),
        })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Convert markdown to an HTML fragment.
///
/// Tables, strikethrough and task lists are enabled. Never fails: any input
/// produces some HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render one section's markdown into a complete styled HTML document.
pub fn render_html_document(markdown: &str, template: &Template) -> String {
    template.wrap(&markdown_to_html(markdown))
}

/// Render one section's markdown into a downloadable document blob.
#[instrument(skip_all, fields(format = %options.format, len = markdown.len()))]
pub fn render_document(markdown: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let document = render_html_document(markdown, &options.template);

    let blob = match options.format {
        RenderFormat::Html => document.into_bytes(),
        RenderFormat::Docx => docx::package_html(&document)?,
    };

    debug!(bytes = blob.len(), "section rendered");
    Ok(blob)
}
