//! Core domain types shared by the segmenter, tracker, and exporter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// JobId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for export job identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a new time-sortable job identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// HeadingLevel
// ---------------------------------------------------------------------------

/// Classification of a section by the marker on its first line.
///
/// Only `#`, `##` and `###` count; deeper markers and plain text are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    None,
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a count of leading `#` characters to a level.
    pub fn from_marker_len(len: usize) -> Self {
        match len {
            1 => Self::H1,
            2 => Self::H2,
            3 => Self::H3,
            _ => Self::None,
        }
    }

    pub fn is_heading(self) -> bool {
        self != Self::None
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "-",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// A contiguous slice of the source document, introduced by at most one heading.
///
/// Sections are immutable once built: the segmenter creates them and every
/// later stage only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    raw_text: String,
    heading_level: HeadingLevel,
    heading_label: String,
}

impl Section {
    /// Build a section from its untrimmed source slice and parsed heading.
    ///
    /// The label is ignored for `HeadingLevel::None`.
    pub fn new(
        raw_text: impl Into<String>,
        heading_level: HeadingLevel,
        heading_label: impl Into<String>,
    ) -> Self {
        let heading_label = if heading_level.is_heading() {
            heading_label.into()
        } else {
            String::new()
        };
        Self {
            raw_text: raw_text.into(),
            heading_level,
            heading_label,
        }
    }

    /// The exact source slice, including the heading line and surrounding whitespace.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The source slice with leading and trailing whitespace removed.
    pub fn text(&self) -> &str {
        self.raw_text.trim()
    }

    pub fn heading_level(&self) -> HeadingLevel {
        self.heading_level
    }

    /// Heading text with the marker stripped, empty for `HeadingLevel::None`.
    pub fn heading_label(&self) -> &str {
        &self.heading_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_roundtrip() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().expect("parse job id");
        assert_eq!(id, parsed);
    }

    #[test]
    fn heading_level_from_marker() {
        assert_eq!(HeadingLevel::from_marker_len(0), HeadingLevel::None);
        assert_eq!(HeadingLevel::from_marker_len(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_marker_len(3), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_marker_len(4), HeadingLevel::None);
    }

    #[test]
    fn section_text_is_trimmed_but_raw_is_not() {
        let section = Section::new("## Login\nbody\n\n", HeadingLevel::H2, "Login");
        assert_eq!(section.raw_text(), "## Login\nbody\n\n");
        assert_eq!(section.text(), "## Login\nbody");
        assert_eq!(section.heading_label(), "Login");
    }

    #[test]
    fn plain_section_drops_label() {
        let section = Section::new("just text", HeadingLevel::None, "ignored");
        assert_eq!(section.heading_label(), "");
    }

    #[test]
    fn heading_level_serializes_lowercase() {
        let json = serde_json::to_string(&HeadingLevel::H2).expect("serialize");
        assert_eq!(json, "\"h2\"");
    }
}
