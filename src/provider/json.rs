//! JSON tree node provider
//!
//! Walks a document made of titled objects nested through a children array:
//!
//! ```json
//! { "title": "Music", "children": [
//!     { "title": "Rock", "children": [ { "title": "Track 1" } ] },
//!     { "title": "Jazz" }
//! ] }
//! ```
//!
//! Node ids are JSON pointers into the document (`""` for the root,
//! `/children/0/children/0` below it), so a parent is found by dropping the
//! last two pointer segments.

use super::error::ProviderError;
use super::{NodeProvider, Result};
use crate::node::{Description, IconKey, Node, NodeId, SortField, SortKey};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Placeholder replaced by the value in title and subtitle masks
const MASK_PLACEHOLDER: &str = "%s";

/// Which tree nodes may be picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TreeSelection {
    /// Only nodes without children
    LeavesOnly,
    /// Every titled node
    #[default]
    AnyNode,
}

/// JSON source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonProviderConfig {
    /// Key holding the row title (required)
    pub title_key: String,
    /// Key holding the row subtitle
    pub subtitle_key: Option<String>,
    /// Key holding the children array (required)
    pub children_key: String,
    /// Title format, `%s` is replaced by the title
    pub title_mask: Option<String>,
    /// Subtitle format, `%s` is replaced by the subtitle
    pub subtitle_mask: Option<String>,
    /// Label of the up row
    pub back_label: Option<String>,
    /// Selectable node kinds
    pub selection: TreeSelection,
}

impl Default for JsonProviderConfig {
    fn default() -> Self {
        Self {
            title_key: "title".to_string(),
            subtitle_key: None,
            children_key: "children".to_string(),
            title_mask: None,
            subtitle_mask: None,
            back_label: None,
            selection: TreeSelection::default(),
        }
    }
}

/// Node provider over an in-memory JSON document
#[derive(Debug, Clone)]
pub struct JsonProvider {
    document: Value,
    config: JsonProviderConfig,
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn apply_mask(mask: Option<&str>, value: &str) -> String {
    match mask {
        Some(mask) if mask.contains(MASK_PLACEHOLDER) => mask.replacen(MASK_PLACEHOLDER, value, 1),
        _ => value.to_string(),
    }
}

/// Scalar rendered as text; objects, arrays and null have none
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Pointer of the object holding the children array `pointer` sits in
fn parent_pointer(pointer: &str) -> Option<&str> {
    if pointer.is_empty() {
        return None;
    }
    let (rest, _index) = pointer.rsplit_once('/')?;
    let (parent, _key) = rest.rsplit_once('/')?;
    Some(parent)
}

impl JsonProvider {
    /// Wrap a parsed document
    #[must_use]
    pub const fn new(document: Value, config: JsonProviderConfig) -> Self {
        Self { document, config }
    }

    /// Parse a document from text
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Json` if `text` is not valid JSON.
    pub fn from_json(text: &str, config: JsonProviderConfig) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?, config))
    }

    /// Read and parse a document file
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Io` if the file cannot be read and
    /// `ProviderError::Json` if it is not valid JSON.
    pub fn from_path(path: &Path, config: JsonProviderConfig) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text, config)
    }

    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Object a node id points at
    #[must_use]
    pub fn object_at(&self, id: &NodeId) -> Option<&Map<String, Value>> {
        self.document.pointer(id.as_str()).and_then(Value::as_object)
    }

    fn check_keys(&self) -> Result<()> {
        if self.config.title_key.is_empty() || self.config.children_key.is_empty() {
            return Err(ProviderError::InvalidConfig(
                "title and children keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn title_of(&self, object: &Map<String, Value>) -> Option<String> {
        object.get(&self.config.title_key).and_then(text_of)
    }

    fn subtitle_of(&self, object: &Map<String, Value>) -> Option<String> {
        self.config
            .subtitle_key
            .as_ref()
            .and_then(|key| object.get(key))
            .and_then(text_of)
    }

    fn child_array<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Vec<Value>> {
        object.get(&self.config.children_key).and_then(Value::as_array)
    }

    fn has_children(&self, object: &Map<String, Value>) -> bool {
        self.child_array(object).is_some_and(|children| !children.is_empty())
    }

    fn node_for(&self, pointer: &str, object: &Map<String, Value>) -> Option<Node> {
        let title = self.title_of(object)?;
        let label = apply_mask(self.config.title_mask.as_deref(), &title);
        let secondary = self
            .subtitle_of(object)
            .map(|s| apply_mask(self.config.subtitle_mask.as_deref(), &s))
            .unwrap_or_default();
        let container = self.has_children(object);

        let node = if container {
            Node::container(pointer, label)
                .with_icon(IconKey::Branch)
                .with_selectable(self.config.selection == TreeSelection::AnyNode)
        } else {
            Node::leaf(pointer, label).with_icon(IconKey::Node)
        };
        let node = node
            .with_secondary(secondary)
            .with_key(SortField::Name, SortKey::Text(title.clone()))
            .with_key(SortField::Title, SortKey::Text(title))
            .with_key(SortField::HasChildren, SortKey::Flag(container));

        Some(match parent_pointer(pointer) {
            Some(parent) => node.with_parent(parent),
            None => node,
        })
    }

    fn node_at(&self, pointer: &str) -> Result<Node> {
        self.document
            .pointer(pointer)
            .and_then(Value::as_object)
            .and_then(|object| self.node_for(pointer, object))
            .ok_or_else(|| ProviderError::InvalidNode(format!("no titled object at '{pointer}'")))
    }

    /// `"/a/b"` trail of subtitles (or titles) from below the root to `node`
    #[must_use]
    pub fn breadcrumb(&self, node: &Node) -> String {
        let mut segments = Vec::new();
        let mut pointer = Some(node.id.as_str());
        while let Some(current) = pointer {
            if current.is_empty() {
                break;
            }
            if let Some(object) = self.document.pointer(current).and_then(Value::as_object) {
                if let Some(text) = self.subtitle_of(object).or_else(|| self.title_of(object)) {
                    segments.push(text);
                }
            }
            pointer = parent_pointer(current);
        }
        if segments.is_empty() {
            return "/".to_string();
        }
        segments.iter().rev().fold(String::new(), |mut trail, segment| {
            trail.push('/');
            trail.push_str(segment);
            trail
        })
    }
}

impl NodeProvider for JsonProvider {
    fn root(&self) -> Result<Node> {
        self.check_keys()?;
        let object = self
            .document
            .as_object()
            .ok_or_else(|| ProviderError::InvalidNode("document root is not an object".into()))?;
        if self.child_array(object).is_none() {
            return Err(ProviderError::InvalidNode(format!(
                "document root has no '{}' array",
                self.config.children_key
            )));
        }
        let title = self.title_of(object).ok_or_else(|| {
            ProviderError::InvalidNode(format!(
                "document root has no '{}' value",
                self.config.title_key
            ))
        })?;

        // An empty children array still makes the root browsable
        Ok(Node::container("", title.clone())
            .with_icon(IconKey::Branch)
            .with_key(SortField::Title, SortKey::Text(title)))
    }

    fn children(&self, node: &Node) -> Result<Vec<Node>> {
        self.check_keys()?;
        let object = self
            .object_at(&node.id)
            .ok_or_else(|| ProviderError::InvalidNode(format!("no object at '{}'", node.id)))?;
        let children = self.child_array(object).ok_or_else(|| {
            ProviderError::denied(
                &node.id,
                format!("no '{}' array", self.config.children_key),
            )
        })?;

        let key = escape_segment(&self.config.children_key);
        let nodes: Vec<Node> = children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| {
                let pointer = format!("{}/{key}/{index}", node.id);
                child
                    .as_object()
                    .and_then(|object| self.node_for(&pointer, object))
            })
            .collect();
        debug!(node = %node.id, count = nodes.len(), "listed json children");
        Ok(nodes)
    }

    fn parent(&self, node: &Node) -> Result<Option<Node>> {
        match parent_pointer(node.id.as_str()) {
            None => Ok(None),
            Some("") => self.root().map(Some),
            Some(parent) => self.node_at(parent).map(Some),
        }
    }

    fn is_within(&self, id: &NodeId, boundary: &NodeId) -> bool {
        let (id, boundary) = (id.as_str(), boundary.as_str());
        id == boundary
            || id
                .strip_prefix(boundary)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn boundary(&self) -> Option<NodeId> {
        Some(NodeId::new(""))
    }

    fn header(&self, node: &Node) -> Description {
        let title = self
            .object_at(&node.id)
            .and_then(|object| self.title_of(object))
            .unwrap_or_else(|| node.label().to_string());
        Description::new(title, self.breadcrumb(node), IconKey::Header)
    }

    fn up_description(&self) -> Description {
        let label = self
            .config
            .back_label
            .clone()
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| "..".to_string());
        Description::new(label, "", IconKey::Back)
    }
}
