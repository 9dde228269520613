use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::node::{NodeKey, OptionNode, SelectionKey};

/// Sibling indices from the roots down to a node.
pub type IndexPath = Vec<usize>;

/// Flattened representation of a tree node.
#[derive(Debug, Clone)]
pub struct FlattenedNode<'a> {
    /// Zero-based level (`0` for roots).
    pub depth: usize,
    /// Borrowed source node.
    pub node: &'a OptionNode,
    /// Index path from the roots to this node.
    pub path: IndexPath,
}

/// Validated, read-only options forest.
///
/// Every leaf lies on the deepest level and siblings are uniquely
/// addressable by the configured [`SelectionKey`].
#[derive(Debug, Clone)]
pub struct OptionTree {
    roots: Vec<OptionNode>,
    depth: usize,
    selection_key: SelectionKey,
}

impl OptionTree {
    /// Validate `roots` and wrap them.
    pub fn new(
        roots: Vec<OptionNode>,
        selection_key: SelectionKey,
    ) -> Result<Self> {
        Self::with_max_depth(roots, selection_key, None)
    }

    /// Same as [`OptionTree::new`] with an upper bound on the depth.
    pub fn with_max_depth(
        roots: Vec<OptionNode>,
        selection_key: SelectionKey,
        max_depth: Option<usize>,
    ) -> Result<Self> {
        if roots.is_empty() {
            return Err(Error::EmptyTree);
        }

        let depth = first_child_depth(&roots);
        if let Some(max) = max_depth {
            if depth > max {
                return Err(Error::TooDeep { depth, max });
            }
        }

        validate_level(&roots, 0, depth, selection_key)?;
        log::debug!(
            "options tree accepted: {} roots, depth {depth}",
            roots.len()
        );

        Ok(Self {
            roots,
            depth,
            selection_key,
        })
    }

    /// Parse a JSON array of nodes and validate it.
    pub fn from_json_str(
        json: &str,
        selection_key: SelectionKey,
    ) -> Result<Self> {
        let roots: Vec<OptionNode> = serde_json::from_str(json)?;
        Self::new(roots, selection_key)
    }

    pub fn roots(&self) -> &[OptionNode] {
        &self.roots
    }

    /// Number of levels, at least `1`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn selection_key(&self) -> SelectionKey {
        self.selection_key
    }

    /// Node addressed by `path`, `None` for an empty or dangling path.
    pub fn node_at(&self, path: &[usize]) -> Option<&OptionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    /// Nodes visited along `path`, stopping at the first dangling index.
    pub fn nodes_along(&self, path: &[usize]) -> Vec<&OptionNode> {
        let mut nodes = Vec::with_capacity(path.len());
        let mut siblings = self.roots.as_slice();
        for index in path {
            let Some(node) = siblings.get(*index) else {
                break;
            };
            nodes.push(node);
            siblings = node.children();
        }
        nodes
    }

    /// Children below `path`; the roots for an empty path, nothing when the
    /// path dangles.
    pub fn children_at(&self, path: &[usize]) -> &[OptionNode] {
        if path.is_empty() {
            return &self.roots;
        }
        self.node_at(path).map(OptionNode::children).unwrap_or(&[])
    }

    /// Position of the sibling addressed by `key`.
    pub fn position_in(
        &self,
        siblings: &[OptionNode],
        key: &NodeKey,
    ) -> Option<usize> {
        siblings
            .iter()
            .position(|node| self.selection_key.matches(node, key))
    }

    /// Depth-first lookup of the first node addressed by `key`.
    pub fn find(&self, key: &NodeKey) -> Option<&OptionNode> {
        find_in(&self.roots, key, self.selection_key)
    }

    /// Depth-first, pre-order listing of every node.
    pub fn flatten(&self) -> Vec<FlattenedNode<'_>> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        for (index, node) in self.roots.iter().enumerate() {
            push_node(node, index, 0, &mut path, &mut entries, false);
        }
        entries
    }

    /// Every leaf in depth-first order.
    pub fn leaves(&self) -> Vec<FlattenedNode<'_>> {
        let mut entries = Vec::new();
        let mut path = Vec::new();
        for (index, node) in self.roots.iter().enumerate() {
            push_node(node, index, 0, &mut path, &mut entries, true);
        }
        entries
    }

    /// Pruned copy keeping the nodes accepted by `predicate`; a rejected
    /// node drops its whole subtree.
    pub fn filter(
        &self,
        predicate: impl Fn(&OptionNode) -> bool,
    ) -> Vec<OptionNode> {
        filter_nodes(&self.roots, &predicate)
    }
}

/// Depth measured along the first child of the first root.
pub fn first_child_depth(roots: &[OptionNode]) -> usize {
    let mut depth = 0;
    let mut current = roots.first();
    while let Some(node) = current {
        depth += 1;
        current = node.children().first();
    }
    depth
}

fn validate_level(
    nodes: &[OptionNode],
    level: usize,
    depth: usize,
    selection_key: SelectionKey,
) -> Result<()> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        let Some(key) = selection_key.key_of(node) else {
            return Err(Error::MissingKey {
                key: selection_key,
                label: node.label().to_owned(),
            });
        };
        if !seen.insert(key) {
            return Err(Error::DuplicateKey {
                key: selection_key,
                value: key.clone(),
            });
        }

        if node.is_leaf() {
            if level + 1 != depth {
                return Err(Error::UnevenDepth {
                    expected: depth - 1,
                    found: level,
                    label: node.label().to_owned(),
                });
            }
        } else {
            validate_level(node.children(), level + 1, depth, selection_key)?;
        }
    }
    Ok(())
}

fn find_in<'a>(
    nodes: &'a [OptionNode],
    key: &NodeKey,
    selection_key: SelectionKey,
) -> Option<&'a OptionNode> {
    for node in nodes {
        if selection_key.matches(node, key) {
            return Some(node);
        }
        if let Some(found) = find_in(node.children(), key, selection_key) {
            return Some(found);
        }
    }
    None
}

fn push_node<'a>(
    node: &'a OptionNode,
    index: usize,
    depth: usize,
    path: &mut IndexPath,
    entries: &mut Vec<FlattenedNode<'a>>,
    leaves_only: bool,
) {
    path.push(index);
    if !leaves_only || node.is_leaf() {
        entries.push(FlattenedNode {
            depth,
            node,
            path: path.clone(),
        });
    }

    for (child_index, child) in node.children().iter().enumerate() {
        push_node(child, child_index, depth + 1, path, entries, leaves_only);
    }

    path.pop();
}

fn filter_nodes(
    nodes: &[OptionNode],
    predicate: &dyn Fn(&OptionNode) -> bool,
) -> Vec<OptionNode> {
    nodes
        .iter()
        .filter(|&node| predicate(node))
        .map(|node| {
            let children = filter_nodes(node.children(), predicate);
            node.clone().with_children(children)
        })
        .collect()
}
