//! End-to-end export pipeline: markdown → sections → placements → rendered files → archive.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use docsplit_archive::{ArchiveBuilder, ArchiveEntry};
use docsplit_markdown::{SegmentOptions, sanitize_name, segment_with};
use docsplit_shared::{AppConfig, HeadingLevel, JobId, Result};

use crate::hierarchy::{HierarchyTracker, NamingOptions};
use crate::renderer::SectionRenderer;

/// Suffix appended to a job label to form the download name.
const LABELED_ARCHIVE_SUFFIX: &str = "_Export.zip";

/// One user-triggered export.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub id: JobId,
    /// The full markdown document to split.
    pub markdown: String,
    /// Phase or document name; only affects the download file name.
    pub label: String,
}

impl ExportJob {
    pub fn new(markdown: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            markdown: markdown.into(),
            label: label.into(),
        }
    }
}

/// Runtime export configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File naming fallbacks.
    pub naming: NamingOptions,
    /// Segmenter behavior.
    pub segment: SegmentOptions,
    /// Download name when the job has no usable label.
    pub archive_file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExportOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            naming: NamingOptions::from(&config.export),
            segment: SegmentOptions {
                skip_fenced_code: config.export.skip_fenced_code,
            },
            archive_file_name: config.export.archive_file_name.clone(),
        }
    }
}

impl ExportOptions {
    /// Download name for an archive produced from a job labeled `label`.
    pub fn archive_file_name_for(&self, label: &str) -> String {
        match sanitize_name(label) {
            Some(name) => format!("{name}{LABELED_ARCHIVE_SUFFIX}"),
            None => self.archive_file_name.clone(),
        }
    }
}

/// Summary of a finished export, suitable for writing next to the archive.
#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub job_id: JobId,
    pub label: String,
    pub archive_file_name: String,
    pub exported_at: DateTime<Utc>,
    pub section_count: usize,
    /// File entries in archive order.
    pub entries: Vec<ArchiveEntry>,
}

/// A finished export: the serialized archive plus its manifest.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub manifest: ExportManifest,
    pub archive: Vec<u8>,
}

/// Where one section would land, without rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSection {
    pub level: HeadingLevel,
    pub label: String,
    /// Archive path of the section's file, extension included.
    pub path: String,
}

/// Progress callback for reporting export status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each section is rendered and written.
    fn section_rendered(&self, path: &str, current: usize, total: usize);
    /// Called when the archive has been finalized.
    fn done(&self, manifest: &ExportManifest);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn section_rendered(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _manifest: &ExportManifest) {}
}

/// Compute every section's archive path without rendering anything.
pub fn plan(
    document: &str,
    extension: &str,
    options: &ExportOptions,
) -> Result<Vec<PlannedSection>> {
    let sections = segment_with(document, &options.segment);
    let mut builder = ArchiveBuilder::new(extension);
    let mut tracker = HierarchyTracker::new(options.naming.clone());

    sections
        .iter()
        .map(|section| -> Result<PlannedSection> {
            let placement = tracker.place(builder.tree_mut(), section)?;
            let path = builder.write(placement.folder, &placement.file_name, Vec::new())?;
            Ok(PlannedSection {
                level: section.heading_level(),
                label: section.heading_label().to_string(),
                path,
            })
        })
        .collect()
}

/// Run one export job to completion.
///
/// 1. Segment the document
/// 2. Place each section (folders are created as headings open them)
/// 3. Render each section, one at a time, in document order
/// 4. Write each rendered blob into the archive tree
/// 5. Serialize the tree into a single zip blob
///
/// Sections are rendered strictly sequentially: at most one render is in
/// flight, and archive insertion order equals document order. The first
/// render or serialization error aborts the job and no archive is returned.
#[instrument(skip_all, fields(job_id = %job.id, label = %job.label))]
pub async fn run_export<R: SectionRenderer>(
    job: &ExportJob,
    renderer: &R,
    options: &ExportOptions,
    progress: &dyn ProgressReporter,
) -> Result<ExportOutcome> {
    let start = Instant::now();
    info!(len = job.markdown.len(), "starting export");

    // --- Phase 1: Segment ---
    progress.phase("Splitting document");
    let sections = segment_with(&job.markdown, &options.segment);
    let total = sections.len();
    debug!(sections = total, "document segmented");

    // --- Phase 2: Place + render ---
    progress.phase("Rendering sections");
    let mut builder = ArchiveBuilder::new(renderer.extension());
    let mut tracker = HierarchyTracker::new(options.naming.clone());

    for (i, section) in sections.iter().enumerate() {
        let placement = tracker.place(builder.tree_mut(), section)?;

        let blob = match renderer.render(section.text()).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(
                    section = i + 1,
                    total,
                    file = %placement.file_name,
                    error = %e,
                    "rendering failed, aborting export"
                );
                return Err(e);
            }
        };

        let path = builder.write(placement.folder, &placement.file_name, blob)?;
        progress.section_rendered(&path, i + 1, total);
    }

    // --- Phase 3: Package ---
    progress.phase("Packaging archive");
    let entries = builder.entries();
    let archive = builder.finalize()?;

    let manifest = ExportManifest {
        job_id: job.id.clone(),
        label: job.label.clone(),
        archive_file_name: options.archive_file_name_for(&job.label),
        exported_at: Utc::now(),
        section_count: total,
        entries,
    };

    info!(
        sections = total,
        files = manifest.entries.len(),
        bytes = archive.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "export complete"
    );
    progress.done(&manifest);

    Ok(ExportOutcome { manifest, archive })
}

#[cfg(test)]
mod tests {
    use crate::renderer::DocumentRenderer;
    use crate::test_support::{
        EchoRenderer, FailingRenderer, RecordingProgress, read_entry, zip_names,
    };

    use super::*;

    const OUTLINE: &str =
        "# Overview\nIntro text.\n## Login\nLogin body.\n### Edge Cases\nEdge text.";

    async fn export(doc: &str) -> ExportOutcome {
        run_export(
            &ExportJob::new(doc, ""),
            &EchoRenderer::default(),
            &ExportOptions::default(),
            &SilentProgress,
        )
        .await
        .expect("export succeeds")
    }

    #[tokio::test]
    async fn outline_becomes_nested_archive() {
        let outcome = export(OUTLINE).await;

        assert_eq!(
            zip_names(&outcome.archive),
            vec![
                "Overview/",
                "Overview/Overview.txt",
                "Overview/Login/",
                "Overview/Login/Login.txt",
                "Overview/Login/Edge Cases.txt",
            ]
        );
        assert_eq!(
            read_entry(&outcome.archive, "Overview/Login/Login.txt"),
            "## Login\nLogin body."
        );
        assert_eq!(
            read_entry(&outcome.archive, "Overview/Login/Edge Cases.txt"),
            "### Edge Cases\nEdge text."
        );
        assert_eq!(outcome.manifest.section_count, 3);
    }

    #[tokio::test]
    async fn headingless_document_is_general_info() {
        let outcome = export("Just a note.").await;
        assert_eq!(zip_names(&outcome.archive), vec!["General_Info.txt"]);
        assert_eq!(read_entry(&outcome.archive, "General_Info.txt"), "Just a note.");
    }

    #[tokio::test]
    async fn deep_headings_stay_in_parent_file() {
        let doc = "intro\n# Scope\nscope body\n#### Detail\ndeep text";
        let outcome = export(doc).await;
        assert_eq!(
            zip_names(&outcome.archive),
            vec!["General_Info.txt", "Scope/", "Scope/Scope.txt"]
        );
        assert!(read_entry(&outcome.archive, "Scope/Scope.txt").contains("#### Detail"));
    }

    #[tokio::test]
    async fn colliding_names_keep_second_section() {
        let doc = "# Plan\n### Notes\nfirst notes\n### Notes\nsecond notes";
        let outcome = export(doc).await;

        let names = zip_names(&outcome.archive);
        assert_eq!(names.iter().filter(|n| n.as_str() == "Plan/Notes.txt").count(), 1);
        assert_eq!(
            read_entry(&outcome.archive, "Plan/Notes.txt"),
            "### Notes\nsecond notes"
        );
        assert_eq!(outcome.manifest.section_count, 3);
        assert_eq!(outcome.manifest.entries.len(), 2);
    }

    #[tokio::test]
    async fn empty_document_produces_empty_archive() {
        let outcome = export("  \n\n ").await;
        assert!(zip_names(&outcome.archive).is_empty());
        assert_eq!(outcome.manifest.section_count, 0);
        assert!(outcome.manifest.entries.is_empty());
    }

    #[tokio::test]
    async fn export_is_idempotent() {
        let first = export(OUTLINE).await;
        let second = export(OUTLINE).await;
        assert_eq!(first.archive, second.archive);
        assert_eq!(first.manifest.entries, second.manifest.entries);
    }

    #[tokio::test]
    async fn renderer_failure_aborts_job() {
        let doc = "# A\n## B\n### C\n### D\n### E";
        let renderer = FailingRenderer::new(3);
        let progress = RecordingProgress::default();

        let result = run_export(
            &ExportJob::new(doc, "Phase 1"),
            &renderer,
            &ExportOptions::default(),
            &progress,
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("render error"));
        assert_eq!(renderer.calls(), 3);
        assert_eq!(progress.rendered().len(), 2);
        assert!(progress.finished().is_none());
    }

    #[tokio::test]
    async fn progress_reports_each_section_in_order() {
        let progress = RecordingProgress::default();
        run_export(
            &ExportJob::new(OUTLINE, ""),
            &EchoRenderer::default(),
            &ExportOptions::default(),
            &progress,
        )
        .await
        .unwrap();

        assert_eq!(
            progress.rendered(),
            vec![
                "1/3 Overview/Overview.txt",
                "2/3 Overview/Login/Login.txt",
                "3/3 Overview/Login/Edge Cases.txt",
            ]
        );
        assert_eq!(progress.finished().as_deref(), Some("Requirements_Export.zip"));
    }

    #[tokio::test]
    async fn labeled_job_names_archive_after_label() {
        let outcome = run_export(
            &ExportJob::new("x", "Discovery: Phase 2"),
            &EchoRenderer::default(),
            &ExportOptions::default(),
            &SilentProgress,
        )
        .await
        .unwrap();
        assert_eq!(outcome.manifest.archive_file_name, "Discovery Phase 2_Export.zip");
        assert_eq!(outcome.manifest.label, "Discovery: Phase 2");
    }

    #[tokio::test]
    async fn real_renderer_produces_docx_entries() {
        let outcome = run_export(
            &ExportJob::new(OUTLINE, ""),
            &DocumentRenderer::default(),
            &ExportOptions::default(),
            &SilentProgress,
        )
        .await
        .unwrap();

        assert!(zip_names(&outcome.archive).contains(&"Overview/Login/Login.docx".to_string()));
        for entry in &outcome.manifest.entries {
            assert!(entry.path.ends_with(".docx"));
            assert!(entry.size_bytes > 0);
        }
    }

    #[test]
    fn plan_lists_paths_without_rendering() {
        let planned = plan(OUTLINE, "docx", &ExportOptions::default()).unwrap();
        let paths: Vec<&str> = planned.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Overview/Overview.docx",
                "Overview/Login/Login.docx",
                "Overview/Login/Edge Cases.docx",
            ]
        );
        assert_eq!(planned[1].level, HeadingLevel::H2);
        assert_eq!(planned[1].label, "Login");
    }

    #[test]
    fn plan_honors_fenced_code_option() {
        let doc = "## Setup\n```sh\n# comment\n```\n";
        let mut options = ExportOptions::default();
        assert_eq!(plan(doc, "html", &options).unwrap().len(), 2);

        options.segment.skip_fenced_code = true;
        assert_eq!(plan(doc, "html", &options).unwrap().len(), 1);
    }

    #[test]
    fn archive_name_falls_back_for_blank_label() {
        let options = ExportOptions::default();
        assert_eq!(options.archive_file_name_for(""), "Requirements_Export.zip");
        assert_eq!(options.archive_file_name_for("???"), "Requirements_Export.zip");
        assert_eq!(options.archive_file_name_for("Design"), "Design_Export.zip");
    }

    #[test]
    fn options_from_config() {
        let mut config = AppConfig::default();
        config.export.fallback_file_name = "Preface".into();
        config.export.skip_fenced_code = true;
        let options = ExportOptions::from(&config);
        assert_eq!(options.naming.fallback_file_name, "Preface");
        assert!(options.segment.skip_fenced_code);
    }
}
