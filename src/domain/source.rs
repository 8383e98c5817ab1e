//! Source tree read from a recording file.
//!
//! Every node carries a closed [`SourceKind`] so the mapping policy can
//! dispatch with a single `match` instead of probing the node repeatedly.

use crate::utils::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered child entries of a container or labelled mapping.
pub type Fields = IndexMap<String, SourceNode>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SourceNode {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<f64>),
    Set(Vec<SourceNode>),
    Mapping(LabelledMapping),
    Container(Container),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Text,
    Integer,
    Float,
    Boolean,
    Array,
    Set,
    Mapping,
    File,
    Subject,
    TimeSeries,
    ImageSeries,
    Table,
    Device,
    Summary,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    File,
    Subject,
    TimeSeries,
    ImageSeries,
    Table,
    Device,
    Summary,
    Group,
}

/// A keyed collection such as `acquisition` or `stimulus`; `label` is the
/// display name of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledMapping {
    pub label: String,
    #[serde(default)]
    pub entries: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

impl SourceNode {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceNode::Text(_) => SourceKind::Text,
            SourceNode::Integer(_) => SourceKind::Integer,
            SourceNode::Float(_) => SourceKind::Float,
            SourceNode::Boolean(_) => SourceKind::Boolean,
            SourceNode::Array(_) => SourceKind::Array,
            SourceNode::Set(_) => SourceKind::Set,
            SourceNode::Mapping(_) => SourceKind::Mapping,
            SourceNode::Container(container) => container.kind.into(),
        }
    }

    /// Text rendering for scalar kinds (text, integer, float); `None` for
    /// everything else, including booleans.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            SourceNode::Text(text) => Some(text.clone()),
            SourceNode::Integer(value) => Some(value.to_string()),
            SourceNode::Float(value) => Some(format!("{:?}", value)),
            _ => None,
        }
    }

    /// Child entries used for generic traversal: container fields or mapping entries.
    pub fn children(&self) -> Option<&Fields> {
        match self {
            SourceNode::Container(container) => Some(&container.fields),
            SourceNode::Mapping(mapping) => Some(&mapping.entries),
            _ => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<&SourceNode> {
        self.children().and_then(|fields| fields.get(key))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SourceNode::Container(container) => Some(&container.name),
            SourceNode::Mapping(mapping) => Some(&mapping.label),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            SourceNode::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            SourceNode::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SourceNode::Integer(value) => Some(*value as f64),
            SourceNode::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<ContainerKind> for SourceKind {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::File => SourceKind::File,
            ContainerKind::Subject => SourceKind::Subject,
            ContainerKind::TimeSeries => SourceKind::TimeSeries,
            ContainerKind::ImageSeries => SourceKind::ImageSeries,
            ContainerKind::Table => SourceKind::Table,
            ContainerKind::Device => SourceKind::Device,
            ContainerKind::Summary => SourceKind::Summary,
            ContainerKind::Group => SourceKind::Group,
        }
    }
}

impl From<Container> for SourceNode {
    fn from(container: Container) -> Self {
        SourceNode::Container(container)
    }
}

impl From<LabelledMapping> for SourceNode {
    fn from(mapping: LabelledMapping) -> Self {
        SourceNode::Mapping(mapping)
    }
}

impl LabelledMapping {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Fields::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<SourceNode>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Container {
    pub fn new(kind: ContainerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<SourceNode>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&SourceNode> {
        self.fields.get(key)
    }

    /// Non-empty text field, trimmed.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(SourceNode::Text(text)) if !text.trim().is_empty() => Some(text.trim()),
            _ => None,
        }
    }

    pub fn number_field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(SourceNode::as_f64)
    }

    /// Sample count, known when the series carries an in-memory `data` array.
    pub fn num_samples(&self) -> Option<usize> {
        self.fields
            .get("data")
            .and_then(SourceNode::as_array)
            .map(<[f64]>::len)
    }
}

impl From<String> for SourceNode {
    fn from(value: String) -> Self {
        SourceNode::Text(value)
    }
}

impl From<&str> for SourceNode {
    fn from(value: &str) -> Self {
        SourceNode::Text(value.to_string())
    }
}

impl From<i64> for SourceNode {
    fn from(value: i64) -> Self {
        SourceNode::Integer(value)
    }
}

impl From<f64> for SourceNode {
    fn from(value: f64) -> Self {
        SourceNode::Float(value)
    }
}

impl From<Vec<f64>> for SourceNode {
    fn from(values: Vec<f64>) -> Self {
        SourceNode::Array(values)
    }
}

/// An opened source file: the root node plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTree {
    pub origin: String,
    pub root: SourceNode,
}

impl SourceTree {
    pub fn new(origin: impl Into<String>, root: impl Into<SourceNode>) -> Self {
        Self {
            origin: origin.into(),
            root: root.into(),
        }
    }

    pub fn from_json_str(origin: impl Into<String>, content: &str) -> Result<Self> {
        let root: SourceNode = serde_json::from_str(content)?;
        Ok(Self::new(origin, root))
    }
}
