//! The section-rendering seam between the export pipeline and document formats.

use std::future::Future;
use std::sync::Arc;

use docsplit_markdown::{RenderOptions, render_document};
use docsplit_shared::{DocsplitError, Result};

/// Converts one section's markdown into a downloadable document blob.
///
/// Implementations must not fail on syntactically odd but non-empty
/// markdown; any error returned here aborts the whole export.
pub trait SectionRenderer: Send + Sync {
    /// Extension (without the dot) appended to every file this renderer produces.
    fn extension(&self) -> &str;

    /// Render `markdown` into a document blob.
    fn render(&self, markdown: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Built-in renderer: markdown → styled HTML → DOCX or HTML.
///
/// Conversion runs on the blocking pool so the export task only suspends
/// while a section is being rendered.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    options: Arc<RenderOptions>,
}

impl DocumentRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl SectionRenderer for DocumentRenderer {
    fn extension(&self) -> &str {
        self.options.format.extension()
    }

    fn render(&self, markdown: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let options = Arc::clone(&self.options);
        let markdown = markdown.to_owned();

        async move {
            tokio::task::spawn_blocking(move || render_document(&markdown, &options))
                .await
                .map_err(|e| DocsplitError::render(format!("render task failed: {e}")))?
        }
    }
}
