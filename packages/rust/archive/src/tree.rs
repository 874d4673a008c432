//! In-memory folder/file tree backing one export archive.
//!
//! Nodes live in an arena; folders map child names to node indices in
//! insertion order. Replacing an existing child keeps its original position,
//! so serialization order always follows first insertion.

use indexmap::IndexMap;

use docsplit_shared::{DocsplitError, Result};

/// Handle to a folder node inside an [`ArchiveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(usize);

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<usize>,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Folder { children: IndexMap<String, usize> },
    File { data: Vec<u8> },
}

/// Outcome of inserting a file into a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No entry of that name existed.
    Created,
    /// An entry of that name existed and was replaced.
    Replaced,
}

/// A single node visited during a depth-first walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry<'a> {
    /// A folder, with its full slash-separated path.
    Folder { path: String },
    /// A file, with its full slash-separated path and contents.
    File { path: String, data: &'a [u8] },
}

/// Hierarchical archive contents. The root folder has no name.
#[derive(Debug)]
pub struct ArchiveTree {
    nodes: Vec<Node>,
}

impl Default for ArchiveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveTree {
    /// Create a tree containing only the root folder.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Folder {
                    children: IndexMap::new(),
                },
            }],
        }
    }

    /// Handle to the root folder.
    pub fn root(&self) -> FolderId {
        FolderId(0)
    }

    /// Return the child folder `name` of `parent`, creating it if absent.
    ///
    /// An existing folder of that name is reused. An existing file of that
    /// name is replaced by a new, empty folder.
    pub fn ensure_folder(&mut self, parent: FolderId, name: &str) -> Result<FolderId> {
        let existing = self.children(parent)?.get(name).copied();

        if let Some(index) = existing {
            if matches!(self.nodes[index].kind, NodeKind::Folder { .. }) {
                return Ok(FolderId(index));
            }
        }

        let index = self.push_node(
            parent,
            name,
            NodeKind::Folder {
                children: IndexMap::new(),
            },
        );
        self.children_mut(parent)?.insert(name.to_string(), index);
        Ok(FolderId(index))
    }

    /// Insert `data` as file `name` under `parent`, replacing any entry of that name.
    pub fn insert_file(
        &mut self,
        parent: FolderId,
        name: &str,
        data: Vec<u8>,
    ) -> Result<InsertOutcome> {
        let existing = self.children(parent)?.get(name).copied();

        match existing {
            Some(index) => {
                if let NodeKind::File { data: current } = &mut self.nodes[index].kind {
                    *current = data;
                } else {
                    let replacement = self.push_node(parent, name, NodeKind::File { data });
                    self.children_mut(parent)?.insert(name.to_string(), replacement);
                }
                Ok(InsertOutcome::Replaced)
            }
            None => {
                let index = self.push_node(parent, name, NodeKind::File { data });
                self.children_mut(parent)?.insert(name.to_string(), index);
                Ok(InsertOutcome::Created)
            }
        }
    }

    /// Slash-separated path of a folder; empty for the root.
    pub fn folder_path(&self, folder: FolderId) -> String {
        self.node_path(folder.0)
    }

    /// Number of files reachable from the root.
    pub fn file_count(&self) -> usize {
        self.walk()
            .iter()
            .filter(|entry| matches!(entry, TreeEntry::File { .. }))
            .count()
    }

    /// Depth-first, insertion-ordered listing of every reachable node except the root.
    pub fn walk(&self) -> Vec<TreeEntry<'_>> {
        let mut out = Vec::new();
        self.visit(0, "", &mut out);
        out
    }

    fn visit<'a>(&'a self, index: usize, prefix: &str, out: &mut Vec<TreeEntry<'a>>) {
        let NodeKind::Folder { children } = &self.nodes[index].kind else {
            return;
        };

        for (name, &child) in children {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            match &self.nodes[child].kind {
                NodeKind::Folder { .. } => {
                    out.push(TreeEntry::Folder { path: path.clone() });
                    self.visit(child, &path, out);
                }
                NodeKind::File { data } => out.push(TreeEntry::File { path, data }),
            }
        }
    }

    fn node_path(&self, index: usize) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    fn push_node(&mut self, parent: FolderId, name: &str, kind: NodeKind) -> usize {
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent.0),
            kind,
        });
        self.nodes.len() - 1
    }

    fn children(&self, folder: FolderId) -> Result<&IndexMap<String, usize>> {
        match self.nodes.get(folder.0).map(|n| &n.kind) {
            Some(NodeKind::Folder { children }) => Ok(children),
            _ => Err(DocsplitError::validation(format!(
                "folder handle {} does not refer to a folder",
                folder.0
            ))),
        }
    }

    fn children_mut(&mut self, folder: FolderId) -> Result<&mut IndexMap<String, usize>> {
        match self.nodes.get_mut(folder.0).map(|n| &mut n.kind) {
            Some(NodeKind::Folder { children }) => Ok(children),
            _ => Err(DocsplitError::validation(format!(
                "folder handle {} does not refer to a folder",
                folder.0
            ))),
        }
    }
}
