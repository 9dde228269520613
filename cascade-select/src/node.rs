use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier carried by an option node.
///
/// Hosts feed either numbers or strings. Comparison is strict: `Int(1)`
/// never equals `Str("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(value) => write!(f, "{value}"),
            NodeKey::Str(value) => f.write_str(value),
        }
    }
}

impl From<i32> for NodeKey {
    fn from(value: i32) -> Self {
        NodeKey::Int(i64::from(value))
    }
}

impl From<u32> for NodeKey {
    fn from(value: u32) -> Self {
        NodeKey::Int(i64::from(value))
    }
}

impl From<i64> for NodeKey {
    fn from(value: i64) -> Self {
        NodeKey::Int(value)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        NodeKey::Str(value.to_owned())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        NodeKey::Str(value)
    }
}

/// Field that drives matching for presses, sibling uniqueness and
/// preselection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKey {
    Id,
    Value,
}

impl SelectionKey {
    /// Read the designated field from `node`.
    pub fn key_of<'a>(&self, node: &'a OptionNode) -> Option<&'a NodeKey> {
        match self {
            SelectionKey::Id => Some(&node.id),
            SelectionKey::Value => node.value.as_ref(),
        }
    }

    /// Whether `node` is addressed by `key` under this field.
    pub fn matches(&self, node: &OptionNode, key: &NodeKey) -> bool {
        self.key_of(node) == Some(key)
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKey::Id => f.write_str("id"),
            SelectionKey::Value => f.write_str("value"),
        }
    }
}

/// One entry of the options tree.
///
/// Any JSON field other than `id`, `label`/`name`, `value` and `children`
/// is kept in [`OptionNode::meta`]. When both `label` and `name` are given,
/// `label` wins and `name` stays in the meta map. A `null` children list
/// reads as a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct OptionNode {
    id: NodeKey,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<NodeKey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<OptionNode>,
    #[serde(flatten)]
    meta: Map<String, Value>,
}

/// Wire shape accepted for a node before the label is settled.
#[derive(Deserialize)]
struct RawNode {
    id: NodeKey,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<NodeKey>,
    #[serde(default, deserialize_with = "null_as_empty")]
    children: Vec<OptionNode>,
    #[serde(flatten)]
    meta: Map<String, Value>,
}

impl TryFrom<RawNode> for OptionNode {
    type Error = String;

    fn try_from(raw: RawNode) -> std::result::Result<Self, Self::Error> {
        let mut meta = raw.meta;
        let label = match (raw.label, raw.name) {
            (Some(label), Some(name)) => {
                meta.insert(String::from("name"), Value::String(name));
                label
            },
            (Some(label), None) | (None, Some(label)) => label,
            (None, None) => {
                return Err(format!("node {} has no label or name", raw.id));
            },
        };

        Ok(Self {
            id: raw.id,
            label,
            value: raw.value,
            children: raw.children,
            meta,
        })
    }
}

fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<OptionNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OptionNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl OptionNode {
    /// Create a leaf node.
    pub fn new(id: impl Into<NodeKey>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: None,
            children: Vec::new(),
            meta: Map::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<NodeKey>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<OptionNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &NodeKey {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> Option<&NodeKey> {
        self.value.as_ref()
    }

    pub fn children(&self) -> &[OptionNode] {
        &self.children
    }

    /// Host-specific fields that are not part of the selection model.
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// A node without children terminates the selection flow.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn label_contains(&self, needle_lower: &str) -> bool {
        self.label.to_lowercase().contains(needle_lower)
    }
}
