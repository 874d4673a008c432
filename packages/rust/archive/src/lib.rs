//! Hierarchical archive assembly and zip serialization.
//!
//! An [`ArchiveBuilder`] owns the [`ArchiveTree`] for exactly one export job.
//! Rendered blobs are written into folders in document order; `finalize`
//! walks the tree depth-first and serializes it to a single zip blob.

mod tree;

use std::io::{Cursor, Write};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use docsplit_shared::{DocsplitError, Result};

pub use tree::{ArchiveTree, FolderId, InsertOutcome, TreeEntry};

/// Metadata for a single file entry in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the archive.
    pub path: String,
    pub size_bytes: usize,
    /// Lowercase hex SHA-256 of the entry contents.
    pub sha256: String,
}

/// Accumulates `(folder, file name, blob)` writes and serializes them once.
#[derive(Debug)]
pub struct ArchiveBuilder {
    tree: ArchiveTree,
    extension: String,
}

impl ArchiveBuilder {
    /// Create an empty archive whose file entries get `extension` appended.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            tree: ArchiveTree::new(),
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tree(&self) -> &ArchiveTree {
        &self.tree
    }

    /// Mutable access for folder creation during hierarchy tracking.
    pub fn tree_mut(&mut self) -> &mut ArchiveTree {
        &mut self.tree
    }

    /// The entry name a section named `file_name` is written under.
    pub fn entry_name(&self, file_name: &str) -> String {
        format!("{file_name}.{}", self.extension)
    }

    /// Write `blob` as `<file_name>.<ext>` inside `folder`.
    ///
    /// An existing entry of the same name is silently replaced (last write
    /// wins). Returns the entry's full path inside the archive.
    pub fn write(&mut self, folder: FolderId, file_name: &str, blob: Vec<u8>) -> Result<String> {
        let name = self.entry_name(file_name);
        let size = blob.len();
        let outcome = self.tree.insert_file(folder, &name, blob)?;

        let folder_path = self.tree.folder_path(folder);
        let path = if folder_path.is_empty() {
            name
        } else {
            format!("{folder_path}/{name}")
        };

        if outcome == InsertOutcome::Replaced {
            warn!(%path, "entry already existed, replaced by later section");
        } else {
            debug!(%path, size, "entry written");
        }

        Ok(path)
    }

    /// Path, size and checksum of every file entry, in serialization order.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        self.tree
            .walk()
            .into_iter()
            .filter_map(|entry| match entry {
                TreeEntry::File { path, data } => {
                    let mut hasher = Sha256::new();
                    hasher.update(data);
                    Some(ArchiveEntry {
                        path,
                        size_bytes: data.len(),
                        sha256: format!("{:x}", hasher.finalize()),
                    })
                }
                TreeEntry::Folder { .. } => None,
            })
            .collect()
    }

    /// Serialize the tree into one zip blob, consuming the builder.
    #[instrument(skip_all, fields(files = self.tree.file_count()))]
    pub fn finalize(self) -> Result<Vec<u8>> {
        let bytes = serialize_zip(&self.tree)?;
        info!(bytes = bytes.len(), "archive finalized");
        Ok(bytes)
    }
}

/// Depth-first zip serialization with fixed timestamps.
///
/// Folders are emitted as explicit directory entries so empty folders
/// survive extraction.
fn serialize_zip(tree: &ArchiveTree) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for entry in tree.walk() {
        match entry {
            TreeEntry::Folder { path } => {
                zip.add_directory(format!("{path}/"), options)
                    .map_err(|e| DocsplitError::archive(format!("directory {path}: {e}")))?;
            }
            TreeEntry::File { path, data } => {
                zip.start_file(path.as_str(), options)
                    .map_err(|e| DocsplitError::archive(format!("entry {path}: {e}")))?;
                zip.write_all(data)
                    .map_err(|e| DocsplitError::archive(format!("entry {path}: {e}")))?;
            }
        }
    }

    let cursor = zip
        .finish()
        .map_err(|e| DocsplitError::archive(format!("finalize: {e}")))?;
    Ok(cursor.into_inner())
}
