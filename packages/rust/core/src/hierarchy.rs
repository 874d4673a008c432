//! Hierarchy tracking: maps the section sequence onto archive folders and file names.
//!
//! H1 sections open a top-level folder, H2 sections open a folder beneath the
//! active H1 (or the root), H3 sections only name a file inside the deepest
//! active folder, and heading-less sections continue the previous placement.

use docsplit_archive::{ArchiveTree, FolderId};
use docsplit_markdown::sanitize_or;
use docsplit_shared::{ExportConfig, HeadingLevel, Result, Section};
use tracing::trace;

/// Naming fallbacks used by the tracker.
#[derive(Debug, Clone)]
pub struct NamingOptions {
    /// File name for content before the first heading.
    pub fallback_file_name: String,
    /// Substitute for labels that sanitize to nothing.
    pub placeholder_name: String,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for NamingOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            fallback_file_name: config.fallback_file_name.clone(),
            placeholder_name: config.placeholder_name.clone(),
        }
    }
}

/// Where one section's rendered file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Folder receiving the file: the root, the active H1 or the active H2.
    pub folder: FolderId,
    /// Sanitized base name, without extension.
    pub file_name: String,
}

/// Traversal context threaded from one section to the next.
///
/// `current_h2`, when set, was created beneath the `current_h1` active at
/// that moment (or beneath the root if none was).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyState {
    pub current_h1: Option<FolderId>,
    pub current_h2: Option<FolderId>,
    /// Placement of the most recent section; `None` before the first one.
    pub target: Option<Placement>,
}

/// Compute the state after consuming `section`.
///
/// Folder creation is the only side effect, and it happens in `tree`.
/// Returns the new state and the section's placement.
pub fn next_target(
    state: &HierarchyState,
    section: &Section,
    tree: &mut ArchiveTree,
    naming: &NamingOptions,
) -> Result<(HierarchyState, Placement)> {
    let root = tree.root();

    let (current_h1, current_h2, placement) = match section.heading_level() {
        HeadingLevel::H1 => {
            let name = sanitize_or(section.heading_label(), &naming.placeholder_name);
            let folder = tree.ensure_folder(root, &name)?;
            let placement = Placement {
                folder,
                file_name: name,
            };
            (Some(folder), None, placement)
        }
        HeadingLevel::H2 => {
            let name = sanitize_or(section.heading_label(), &naming.placeholder_name);
            let parent = state.current_h1.unwrap_or(root);
            let folder = tree.ensure_folder(parent, &name)?;
            let placement = Placement {
                folder,
                file_name: name,
            };
            (state.current_h1, Some(folder), placement)
        }
        HeadingLevel::H3 => {
            let name = sanitize_or(section.heading_label(), &naming.placeholder_name);
            let folder = state.current_h2.or(state.current_h1).unwrap_or(root);
            let placement = Placement {
                folder,
                file_name: name,
            };
            (state.current_h1, state.current_h2, placement)
        }
        HeadingLevel::None => {
            let placement = state.target.clone().unwrap_or_else(|| Placement {
                folder: root,
                file_name: sanitize_or(&naming.fallback_file_name, &naming.placeholder_name),
            });
            (state.current_h1, state.current_h2, placement)
        }
    };

    let next = HierarchyState {
        current_h1,
        current_h2,
        target: Some(placement.clone()),
    };

    trace!(
        level = %section.heading_level(),
        folder = %tree.folder_path(placement.folder),
        file = %placement.file_name,
        "section placed"
    );

    Ok((next, placement))
}

/// Stateful wrapper applying [`next_target`] to sections in document order.
#[derive(Debug, Clone, Default)]
pub struct HierarchyTracker {
    state: HierarchyState,
    naming: NamingOptions,
}

impl HierarchyTracker {
    pub fn new(naming: NamingOptions) -> Self {
        Self {
            state: HierarchyState::default(),
            naming,
        }
    }

    pub fn state(&self) -> &HierarchyState {
        &self.state
    }

    /// Place the next section, creating its folder in `tree` if it opens one.
    pub fn place(&mut self, tree: &mut ArchiveTree, section: &Section) -> Result<Placement> {
        let (state, placement) = next_target(&self.state, section, tree, &self.naming)?;
        self.state = state;
        Ok(placement)
    }
}
