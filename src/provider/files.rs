//! Filesystem node provider
//!
//! Directories are containers, everything else is a leaf. Node ids are
//! canonical absolute paths, so a node's parent is simply its parent
//! directory and containment is a path-prefix test.
//!
//! # Filtering
//!
//! - hidden entries (leading `.`) are skipped unless `show_hidden` is set
//! - unreadable entries are skipped; readability is an access check, so
//!   FIFOs and device nodes are never opened
//! - in [`FileSelection::Directories`] mode files are skipped entirely
//! - otherwise files must match one of the configured name patterns, if any

use super::error::ProviderError;
use super::format::FormatConfig;
use super::pattern::{NamePattern, compile_all};
use super::{NodeProvider, Result};
use crate::node::{Description, IconKey, Node, NodeId, SortField, SortKey};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Which filesystem entries may be picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FileSelection {
    /// Regular files only
    Files,
    /// Directories only; files are hidden
    Directories,
    /// Files and directories
    #[default]
    FilesAndDirectories,
}

impl FileSelection {
    const fn allows_files(self) -> bool {
        matches!(self, Self::Files | Self::FilesAndDirectories)
    }

    const fn allows_directories(self) -> bool {
        matches!(self, Self::Directories | Self::FilesAndDirectories)
    }
}

/// Filesystem source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Browsing never ascends above this directory
    pub root: PathBuf,
    /// Directory shown first, when it is readable and inside `root`
    pub start: Option<PathBuf>,
    /// Directory shown when `root` is not readable
    pub fallback: Option<PathBuf>,
    /// Selectable entry kinds
    pub selection: FileSelection,
    /// File-name patterns (glob, or regex with `re:` prefix)
    pub patterns: Vec<String>,
    /// Show dot-files
    pub show_hidden: bool,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            start: None,
            fallback: None,
            selection: FileSelection::default(),
            patterns: Vec::new(),
            show_hidden: false,
        }
    }
}

/// Canonical form of `path`, or its absolute form when it does not exist
fn resolve(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(_) => Ok(std::path::absolute(path)?),
    }
}

/// Read permission check that never opens the file
#[cfg(unix)]
fn readable(path: &Path) -> bool {
    nix::unistd::access(path, nix::unistd::AccessFlags::R_OK).is_ok()
}

#[cfg(not(unix))]
fn readable(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Node provider over the local filesystem
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
    start: Option<PathBuf>,
    fallback: Option<PathBuf>,
    selection: FileSelection,
    patterns: Vec<NamePattern>,
    show_hidden: bool,
    format: FormatConfig,
}

impl FileProvider {
    /// Create a provider, compiling patterns and resolving paths
    ///
    /// Existing paths are canonicalized, so `..` segments and symlinks in
    /// `root`, `start` or `fallback` cannot defeat the containment check.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Pattern` for an invalid pattern and
    /// `ProviderError::Io` if a configured path cannot be made absolute.
    pub fn new(config: FileProviderConfig, format: FormatConfig) -> Result<Self> {
        let patterns = compile_all(&config.patterns)?;
        let start = config.start.as_deref().map(resolve).transpose()?;
        let fallback = config.fallback.as_deref().map(resolve).transpose()?;

        Ok(Self {
            root: resolve(&config.root)?,
            start,
            fallback,
            selection: config.selection,
            patterns,
            show_hidden: config.show_hidden,
            format,
        })
    }

    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn selection(&self) -> FileSelection {
        self.selection
    }

    /// Path a node stands for
    #[must_use]
    pub fn path_of(node: &Node) -> PathBuf {
        PathBuf::from(node.id.as_str())
    }

    fn readable_dir(path: &Path) -> bool {
        path.is_dir() && fs::read_dir(path).is_ok()
    }

    fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    /// Whether a file name passes the pattern filter
    #[must_use]
    pub fn accepts_file(&self, name: &str) -> bool {
        self.selection.allows_files()
            && (self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(name)))
    }

    fn label_for(path: &Path) -> String {
        path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Build the node for `path` from already-read metadata
    fn node_for(&self, path: &Path, meta: &Metadata) -> Node {
        let label = Self::label_for(path);
        let modified = meta.modified().ok();
        let modified_ms = modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        let date = modified.map(|t| self.format.format_time(t)).unwrap_or_default();

        let node = if meta.is_dir() {
            Node::container(NodeId::from_path(path), label.clone())
                .with_selectable(self.selection.allows_directories())
                .with_secondary(date)
                .with_key(SortField::Size, SortKey::Number(0))
        } else {
            let size = meta.len();
            Node::leaf(NodeId::from_path(path), label.clone())
                .with_selectable(self.selection.allows_files())
                .with_secondary(format!("{} - {date}", self.format.format_size(size)))
                .with_key(
                    SortField::Size,
                    SortKey::Number(i64::try_from(size).unwrap_or(i64::MAX)),
                )
        };

        let node = node
            .with_key(SortField::Name, SortKey::Text(label.clone()))
            .with_key(SortField::Title, SortKey::Text(label))
            .with_key(SortField::Modified, SortKey::Number(modified_ms))
            .with_key(SortField::HasChildren, SortKey::Flag(meta.is_dir()));

        match path.parent() {
            Some(parent) => node.with_parent(NodeId::from_path(parent)),
            None => node,
        }
    }

    fn dir_node(&self, path: &Path) -> Result<Node> {
        let meta = fs::metadata(path)
            .map_err(|e| ProviderError::denied(&NodeId::from_path(path), e.to_string()))?;
        if !meta.is_dir() {
            return Err(ProviderError::InvalidNode(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        Ok(self.node_for(path, &meta))
    }

    /// Entry survives filtering; returns its metadata when it does
    fn visible(&self, path: &Path, name: &str) -> Option<Metadata> {
        if !self.show_hidden && Self::is_hidden(name) {
            return None;
        }
        let meta = fs::metadata(path).ok()?;
        if meta.is_dir() {
            Self::readable_dir(path).then_some(meta)
        } else if self.accepts_file(name) && readable(path) {
            Some(meta)
        } else {
            None
        }
    }

    fn effective_boundary(&self) -> Option<&Path> {
        if Self::readable_dir(&self.root) {
            Some(&self.root)
        } else {
            self.fallback.as_deref().filter(|dir| Self::readable_dir(dir))
        }
    }
}

impl NodeProvider for FileProvider {
    fn root(&self) -> Result<Node> {
        if let Some(start) = self.start.as_deref() {
            if start.starts_with(&self.root) && Self::readable_dir(start) {
                debug!(start = %start.display(), "opening at start directory");
                return self.dir_node(start);
            }
            warn!(start = %start.display(), "start directory unusable, using root");
        }
        match self.effective_boundary() {
            Some(dir) => self.dir_node(dir),
            None => Err(ProviderError::denied(
                &NodeId::from_path(&self.root),
                "root directory is not readable and no fallback is available",
            )),
        }
    }

    fn children(&self, node: &Node) -> Result<Vec<Node>> {
        let dir = Self::path_of(node);
        let entries =
            fs::read_dir(&dir).map_err(|e| ProviderError::denied(&node.id, e.to_string()))?;

        let mut nodes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(meta) = self.visible(&path, &name) {
                nodes.push(self.node_for(&path, &meta));
            }
        }
        debug!(dir = %dir.display(), count = nodes.len(), "listed directory");
        Ok(nodes)
    }

    fn parent(&self, node: &Node) -> Result<Option<Node>> {
        Self::path_of(node)
            .parent()
            .map(|parent| self.dir_node(parent))
            .transpose()
    }

    fn is_within(&self, id: &NodeId, boundary: &NodeId) -> bool {
        Path::new(id.as_str()).starts_with(Path::new(boundary.as_str()))
    }

    fn boundary(&self) -> Option<NodeId> {
        self.effective_boundary().map(NodeId::from_path)
    }

    fn header(&self, node: &Node) -> Description {
        Description::new(node.label(), node.id.as_str(), IconKey::Header)
    }

    fn up_description(&self) -> Description {
        Description::new("..", "Parent directory", IconKey::Back)
    }
}
