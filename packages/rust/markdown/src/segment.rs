//! Heading-driven document segmentation.
//!
//! A single forward scan over the document's lines. Every line whose first
//! non-blank content is `#`, `##` or `###` followed by a space or tab starts
//! a new section; the heading line stays attached to the section it opens.
//! Deeper headings (`####` and beyond) never split.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use docsplit_shared::{HeadingLevel, Section};

/// Options controlling where the segmenter may cut.
#[derive(Debug, Clone, Default)]
pub struct SegmentOptions {
    /// Treat heading-like lines inside fenced code blocks as body text.
    pub skip_fenced_code: bool,
}

/// Split a document into sections at H1–H3 heading lines.
pub fn segment(document: &str) -> Vec<Section> {
    segment_with(document, &SegmentOptions::default())
}

/// Split a document into sections, honoring `options`.
///
/// Output order matches source order. Slices that are blank after trimming
/// are dropped, so an empty document yields no sections.
#[instrument(skip_all, fields(len = document.len()))]
pub fn segment_with(document: &str, options: &SegmentOptions) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut open_fence: Option<char> = None;

    for line in document.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        if options.skip_fenced_code {
            if let Some(marker) = fence_marker(content) {
                open_fence = match open_fence {
                    None => Some(marker),
                    Some(open) if open == marker => None,
                    other => other,
                };
                offset += line.len();
                continue;
            }
        }

        if open_fence.is_none() && offset > start && parse_heading(content).is_some() {
            push_section(&mut sections, &document[start..offset]);
            start = offset;
        }

        offset += line.len();
    }

    push_section(&mut sections, &document[start..]);

    debug!(sections = sections.len(), "segmentation complete");
    sections
}

/// Parse a single line (without its terminator) as an H1–H3 heading.
///
/// Returns the level and the label with the marker and surrounding
/// whitespace stripped.
pub fn parse_heading(line: &str) -> Option<(HeadingLevel, &str)> {
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[ \t]*(#{1,3})[ \t]+(.*)$").expect("valid regex"));

    let caps = HEADING_RE.captures(line)?;
    let level = HeadingLevel::from_marker_len(caps.get(1)?.as_str().len());
    let label = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((level, label))
}

fn push_section(sections: &mut Vec<Section>, slice: &str) {
    if slice.trim().is_empty() {
        return;
    }

    let first_line = slice
        .trim_start()
        .lines()
        .next()
        .unwrap_or_default();

    let section = match parse_heading(first_line) {
        Some((level, label)) => Section::new(slice, level, label),
        None => Section::new(slice, HeadingLevel::None, ""),
    };
    sections.push(section);
}

/// Return the fence character if `line` opens or closes a fenced code block.
fn fence_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}
